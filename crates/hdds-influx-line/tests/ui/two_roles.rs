#![allow(dead_code)]

use hdds_influx_line::LineProtocol;

#[derive(LineProtocol)]
struct Sample {
    #[influx(tag, field)]
    worker: String,
}

fn main() {}
