#![allow(dead_code)]

use hdds_influx_line::LineProtocol;

#[derive(LineProtocol)]
struct Sample {
    #[influx(measurement = "name")]
    mode: String,
}

fn main() {}
