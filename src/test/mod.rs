mod scheduler;
mod sim_time;
mod support;
mod window;
