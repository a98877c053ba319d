use std::path::PathBuf;
use std::process;

use crate::{resample, roi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Resample,
    Roi,
}

#[derive(Debug, Default)]
pub(crate) struct HeadlessArgs {
    pub command: Option<Command>,
    pub job_path: Option<PathBuf>,
    pub out_path: Option<PathBuf>,
    pub mask_path: Option<PathBuf>,
    pub preview_path: Option<PathBuf>,
    pub summary: bool,
}

pub(crate) fn run(args: &[String]) -> Result<(), String> {
    let parsed = parse_args(args)?;
    let job_path = parsed
        .job_path
        .clone()
        .ok_or_else(|| "--job <path> is required".to_string())?;
    match parsed.command {
        Some(Command::Resample) => resample::run(&job_path, &parsed),
        Some(Command::Roi) => roi::run(&job_path, &parsed),
        None => {
            print_help();
            Err("missing command (resample or roi)".to_string())
        }
    }
}

pub(crate) fn parse_args(args: &[String]) -> Result<HeadlessArgs, String> {
    let mut parsed = HeadlessArgs::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "resample" => parsed.command = Some(Command::Resample),
            "roi" => parsed.command = Some(Command::Roi),
            "--job" => parsed.job_path = Some(path_arg("--job", iter.next())?),
            "--out" => parsed.out_path = Some(path_arg("--out", iter.next())?),
            "--mask" => parsed.mask_path = Some(path_arg("--mask", iter.next())?),
            "--preview" => parsed.preview_path = Some(path_arg("--preview", iter.next())?),
            "--summary" => parsed.summary = true,
            "--log-level" => {
                iter.next();
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => return Err(format!("unknown argument {other}")),
        }
    }

    Ok(parsed)
}

fn path_arg(flag: &str, value: Option<&String>) -> Result<PathBuf, String> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| format!("{flag} requires a path"))
}

fn print_help() {
    println!(
        "Usage:\n  surfvol resample --job <job.json> [--out <grid.f32>] [--summary]\n  surfvol roi --job <roi.json> [--mask <mask.png>] [--out <mask.json>] [--preview <preview.png>]\n\nOptions:\n  --log-level <off|error|warn|info|debug|trace>"
    );
}
