use agrifusion_core::soil::Crop;
use anyhow::Result;
use std::process::ExitCode;

pub fn run() -> Result<ExitCode> {
    for name in Crop::names() {
        println!("{}", name);
    }
    Ok(ExitCode::SUCCESS)
}
