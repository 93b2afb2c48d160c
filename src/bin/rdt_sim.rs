//! 可靠数据传输仿真
//!
//! 在不可靠网络上运行停等或滑动窗口协议，打印统计信息，可选输出 JSON 追踪文件。

use clap::{Parser, ValueEnum};
use rdt_sim::error::SimError;
use rdt_sim::net::EndpointId;
use rdt_sim::sim::{PayloadKind, ProtocolSpec, SimConfig, Simulator};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProtocolArg {
    StopWait,
    Window,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PayloadArg {
    Random,
    Numbered,
}

#[derive(Debug, Parser)]
#[command(name = "rdt-sim", about = "不可靠网络上的可靠数据传输仿真（停等 / 滑动窗口）")]
struct Args {
    /// JSON 配置文件；命令行参数覆盖其中的同名字段
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    protocol: Option<ProtocolArg>,

    /// 应用层消息总数
    #[arg(long)]
    messages: Option<u32>,

    /// 丢包概率
    #[arg(long)]
    loss: Option<f64>,

    /// 损坏概率
    #[arg(long)]
    corrupt: Option<f64>,

    /// 到达间隔尺度
    #[arg(long)]
    lambda: Option<f64>,

    /// 应用层消息随机落到两个端点
    #[arg(long, default_value_t = false)]
    bidirectional: bool,

    /// 0..=3，未设置 RUST_LOG 时决定日志级别
    #[arg(long)]
    debug_level: Option<u8>,

    #[arg(long)]
    seed: Option<u64>,

    /// 滑动窗口大小（仅 window 协议）
    #[arg(long)]
    window_size: Option<usize>,

    /// 重传超时
    #[arg(long)]
    timeout: Option<f64>,

    /// 停等接收方的 ACK 保活间隔（需要同时设置 --max-time）
    #[arg(long)]
    ack_keepalive: Option<f64>,

    /// 仿真运行到的最大时间
    #[arg(long)]
    max_time: Option<f64>,

    #[arg(long, value_enum)]
    payload: Option<PayloadArg>,

    /// 输出 JSON 追踪事件文件；不填则不生成
    #[arg(long)]
    trace_json: Option<PathBuf>,
}

fn apply_overrides(mut cfg: SimConfig, args: &Args) -> SimConfig {
    if let Some(v) = args.messages {
        cfg.num_messages = v;
    }
    if let Some(v) = args.loss {
        cfg.loss_prob = v;
    }
    if let Some(v) = args.corrupt {
        cfg.corrupt_prob = v;
    }
    if let Some(v) = args.lambda {
        cfg.lambda = v;
    }
    if args.bidirectional {
        cfg.bidirectional = true;
    }
    if let Some(v) = args.debug_level {
        cfg.debug_level = v;
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    if args.max_time.is_some() {
        cfg.max_time = args.max_time;
    }
    if let Some(p) = args.payload {
        cfg.payload = match p {
            PayloadArg::Random => PayloadKind::Random,
            PayloadArg::Numbered => PayloadKind::Numbered,
        };
    }

    // 切换协议时丢弃另一种协议的参数
    cfg.protocol = match (args.protocol, cfg.protocol) {
        (Some(ProtocolArg::Window), ProtocolSpec::StopWait { .. }) => ProtocolSpec::Window {
            window_size: None,
            timeout: None,
        },
        (Some(ProtocolArg::StopWait), ProtocolSpec::Window { .. }) => ProtocolSpec::StopWait {
            timeout: None,
            ack_keepalive: None,
        },
        (_, spec) => spec,
    };
    match &mut cfg.protocol {
        ProtocolSpec::StopWait {
            timeout,
            ack_keepalive,
        } => {
            if args.timeout.is_some() {
                *timeout = args.timeout;
            }
            if args.ack_keepalive.is_some() {
                *ack_keepalive = args.ack_keepalive;
            }
        }
        ProtocolSpec::Window {
            window_size,
            timeout,
        } => {
            if args.window_size.is_some() {
                *window_size = args.window_size;
            }
            if args.timeout.is_some() {
                *timeout = args.timeout;
            }
        }
    }
    cfg
}

fn default_filter(debug_level: u8) -> &'static str {
    match debug_level {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn run(args: Args) -> Result<(), SimError> {
    let cfg = match &args.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    let cfg = apply_overrides(cfg, &args);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter(cfg.debug_level))),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mut sim = Simulator::with_protocol(cfg)?;
    if args.trace_json.is_some() {
        sim.enable_trace();
    }

    sim.run()?;

    if let Some(path) = &args.trace_json {
        if let Some(t) = sim.take_trace() {
            let json = serde_json::to_string_pretty(&t.events)?;
            fs::write(path, json)?;
            eprintln!("wrote trace events to {}", path.display());
        }
    }

    let s = sim.stats();
    let tx = s.endpoint(EndpointId::Sender);
    let rx = s.endpoint(EndpointId::Receiver);
    println!(
        "done @ {}\n  events={}, arrivals={}/{}, delivered={}/{}\n  net: lost={}, corrupted={} (payload={}, seq={}, ack={}), retransmissions={}, timer_warnings={}",
        sim.now(),
        s.events,
        tx.app_arrivals,
        rx.app_arrivals,
        rx.delivered,
        tx.delivered,
        s.lost_pkts,
        s.corrupted_pkts,
        s.corrupted_payload,
        s.corrupted_seq,
        s.corrupted_ack,
        s.retransmissions(),
        s.timer_conflicts + s.timer_absent,
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
