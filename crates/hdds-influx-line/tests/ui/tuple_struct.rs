#![allow(dead_code)]

use hdds_influx_line::LineProtocol;

#[derive(LineProtocol)]
struct Pair(i64, i64);

fn main() {}
