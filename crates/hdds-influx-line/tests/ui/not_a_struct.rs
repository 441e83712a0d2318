#![allow(dead_code)]

use hdds_influx_line::LineProtocol;

#[derive(LineProtocol)]
enum Kind { Upload, Download }

fn main() {}
