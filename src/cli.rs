// ============================================================================
// Obscura CLI — headless region redaction, no window
// ============================================================================
//
// Usage:
//   obscura                          open the GUI
//   obscura photo.png                open the GUI with photo.png loaded
//   obscura -i in.png -o out.png --region 40,120,300x80 [--region ...]
//
// Headless mode applies the fixed-strength region blur to each rectangle
// in order and writes the result as PNG. Everything runs synchronously on
// the current thread; no window is ever created.

use clap::Parser;
use std::path::PathBuf;

use crate::io;
use crate::ops::region::{Selection, region_blur};

/// Blur-redact images: paste or open an image, blur the sensitive parts,
/// copy or save the result.
#[derive(Parser, Debug)]
#[command(
    name = "obscura",
    about = "Blur-redact images, interactively or from the command line",
    long_about = "Without --input, opens the GUI (optionally with IMAGE loaded).\n\
                  With --input, applies the region blur to each --region rectangle\n\
                  and writes a PNG without opening a window.\n\n\
                  Example:\n  \
                  obscura -i screenshot.png -o redacted.png --region 40,120,300x80"
)]
pub struct CliArgs {
    /// Image to open in the GUI at startup.
    pub image: Option<PathBuf>,

    /// Headless input file. Requires --output and at least one --region.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Headless output PNG path.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Rectangle to blur, as X,Y,WxH (buffer pixels). Repeatable.
    #[arg(short, long, value_name = "X,Y,WxH")]
    pub region: Vec<String>,
}

impl CliArgs {
    /// True when a headless flag is present in the real process arguments.
    /// Checked by `main()` before an eframe window is ever created.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i")
    }
}

/// Parse an "X,Y,WxH" rectangle spec.
fn parse_region(spec: &str) -> Result<Selection, String> {
    let parts: Vec<&str> = spec.split(',').collect();
    let [x, y, dims] = parts.as_slice() else {
        return Err("expected X,Y,WxH".to_string());
    };
    let (w, h) = dims
        .split_once('x')
        .ok_or_else(|| "expected WxH after the second comma".to_string())?;

    let parse = |s: &str, what: &str| -> Result<f32, String> {
        s.trim()
            .parse::<f32>()
            .map_err(|_| format!("bad {}: {:?}", what, s))
    };
    let x = parse(x, "X")?;
    let y = parse(y, "Y")?;
    let w = parse(w, "W")?;
    let h = parse(h, "H")?;
    if w <= 0.0 || h <= 0.0 {
        return Err("width and height must be positive".to_string());
    }
    Ok(Selection::from_corners((x, y), (x + w, y + h)))
}

/// Run headless redaction. Returns a process exit status.
pub fn run(args: CliArgs) -> i32 {
    let (Some(input), Some(output)) = (&args.input, &args.output) else {
        eprintln!("headless mode needs both --input and --output");
        return 1;
    };
    if args.region.is_empty() {
        eprintln!("headless mode needs at least one --region");
        return 1;
    }

    let mut img = match io::load_image(input) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("{}: {}", input.display(), e);
            return 1;
        }
    };

    for spec in &args.region {
        let sel = match parse_region(spec) {
            Ok(sel) => sel,
            Err(e) => {
                eprintln!("bad --region {:?}: {}", spec, e);
                return 1;
            }
        };
        if region_blur(&mut img, sel).is_none() {
            eprintln!(
                "region {:?} does not intersect the {}x{} image; skipped",
                spec,
                img.width(),
                img.height()
            );
        }
    }

    match io::save_png(&img, output) {
        Ok(()) => {
            println!("wrote {}", output.display());
            0
        }
        Err(e) => {
            eprintln!("{}: {}", output.display(), e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_region_specs() {
        let sel = parse_region("40,120,300x80").unwrap();
        assert_eq!(sel.x, 40.0);
        assert_eq!(sel.y, 120.0);
        assert_eq!(sel.width, 300.0);
        assert_eq!(sel.height, 80.0);

        let sel = parse_region(" 0 , 0 , 1x1 ").unwrap();
        assert_eq!((sel.width, sel.height), (1.0, 1.0));
    }

    #[test]
    fn rejects_malformed_region_specs() {
        for bad in ["", "1,2", "1,2,3", "1,2,3x", "a,2,3x4", "1,2,0x5", "1,2,-3x4"] {
            assert!(parse_region(bad).is_err(), "accepted {:?}", bad);
        }
    }
}
