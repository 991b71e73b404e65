// main.rs      gifcodec command
//
// Copyright (c) 2026  gifcodec developers
//
#![forbid(unsafe_code)]

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gifcodec::block::DisposalMethod;
use gifcodec::{Component, Decoder, ErrorState, Gif, GifFrame, Palette};
use std::error::Error;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Auto);
    let res = match create_app().get_matches().subcommand() {
        ("show", Some(matches)) => show(&mut out, matches),
        ("check", Some(matches)) => check(&mut out, matches),
        ("recode", Some(matches)) => recode(matches),
        ("palette", Some(matches)) => palette(matches),
        _ => Ok(()),
    };
    out.reset()?;
    res
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gifcodec")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("GIF file utility")
        .setting(AppSettings::ArgRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("show")
                .about("Show GIF frame table")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("check")
                .about("Check GIF files for malformed data")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("recode")
                .about("Decode a GIF and write it back")
                .arg(Arg::with_name("input").required(true).help("input file"))
                .arg(
                    Arg::with_name("output")
                        .required(true)
                        .help("output file"),
                ),
        )
        .subcommand(
            SubCommand::with_name("palette")
                .about("Export global colour table as an .act file")
                .arg(Arg::with_name("input").required(true).help("input file"))
                .arg(
                    Arg::with_name("output")
                        .required(true)
                        .help("output file"),
                ),
        )
}

/// Decode one GIF file
fn decode_file(path: &OsStr) -> Result<Gif, Box<dyn Error>> {
    Ok(Decoder::new(File::open(path)?).decode()?)
}

/// Get a required path argument
fn path_arg<'a>(
    matches: &'a ArgMatches,
    name: &str,
) -> Result<&'a OsStr, Box<dyn Error>> {
    matches
        .value_of_os(name)
        .ok_or_else(|| format!("missing {name}").into())
}

/// Handle show subcommand
fn show(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            show_file(out, path)?;
        }
    }
    Ok(())
}

/// Show one GIF file
fn show_file(
    out: &mut StandardStream,
    path: &OsStr,
) -> Result<(), Box<dyn Error>> {
    let mut magenta = ColorSpec::new();
    magenta.set_fg(Some(Color::Magenta));
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    let mut yellow = ColorSpec::new();
    yellow.set_fg(Some(Color::Yellow)).set_intense(true);
    let mut cyan = ColorSpec::new();
    cyan.set_fg(Some(Color::Cyan)).set_intense(true);
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    let gif = decode_file(path)?;
    out.set_color(&magenta)?;
    writeln!(out, "{path:?}")?;
    if gif.header().error_state() != ErrorState::OK {
        out.set_color(&red)?;
        writeln!(out, "{}", gif.header().status().message())?;
        return Ok(());
    }
    let frames = gif.frames();
    let frame_digits = digits(frames.len()).max(3);
    let width = gif.screen_desc().screen_width();
    let height = gif.screen_desc().screen_height();
    let size_digits = 4.max(1 + digits(width) + digits(height));
    let mut comments = vec![];
    for cmt in gif.comments() {
        for l in cmt.text().split('\n') {
            let l = l.trim();
            if !l.is_empty() {
                comments.push(l.to_string());
            }
        }
    }
    out.set_color(&bold)?;
    write!(out, "GIF{}, frames: {}", gif.header().version(), frames.len())?;
    if let Some(c) = gif.loop_count() {
        write!(out, ", repeat: ")?;
        if c == 0 {
            write!(out, "∞")?;
        } else {
            write!(out, "{c}")?;
        }
    }
    writeln!(out)?;
    out.set_color(&cyan)?;
    for c in comments {
        writeln!(out, "  # {c}")?;
    }
    out.set_color(&yellow)?;
    write!(out, " {:>w$}", "Fr#", w = frame_digits)?;
    write!(out, "  Delay Disp")?;
    write!(out, " {:>w$}", "Size", w = size_digits)?;
    write!(out, " {:>w$}", "X,Y", w = size_digits)?;
    writeln!(out, " Clrs Trn")?;
    let global_clr = gif.screen_desc().global_colour_table_len();
    let layout = Layout {
        width,
        height,
        global_clr,
        frame_digits,
        size_digits,
    };
    for (n, f) in frames.iter().enumerate() {
        show_frame(out, f, n, &layout)?;
    }
    Ok(())
}

/// Column layout of the frame table
struct Layout {
    width: u16,
    height: u16,
    global_clr: usize,
    frame_digits: usize,
    size_digits: usize,
}

/// Show one frame of a GIF file
fn show_frame(
    out: &mut StandardStream,
    frame: &GifFrame,
    number: usize,
    layout: &Layout,
) -> Result<(), Box<dyn Error>> {
    let mut dflt = ColorSpec::new();
    dflt.set_fg(Some(Color::White));
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    let desc = frame.image_desc();
    out.set_color(&dflt)?;
    let interlaced = if desc.interlaced() { 'i' } else { ' ' };
    write!(out, "{interlaced}")?;
    out.set_color(&bold)?;
    write!(out, "{:>w$}", number, w = layout.frame_digits)?;
    let d = frame.delay_time_cs().unwrap_or(0);
    if d == 0 {
        out.set_color(&dflt)?;
    }
    write!(out, " {:6.2}", f32::from(d) / 100.0)?;
    let d = match frame.graphic_control() {
        Some(gc) => match gc.disposal_method() {
            DisposalMethod::NotSpecified => "none",
            DisposalMethod::DoNotDispose => "keep",
            DisposalMethod::RestoreToBackgroundColour => "bg",
            DisposalMethod::RestoreToPrevious => "prev",
            DisposalMethod::Reserved(_) => "res",
        },
        None => "-",
    };
    out.set_color(match d {
        "none" | "-" => &dflt,
        "res" => &red,
        _ => &bold,
    })?;
    write!(out, " {d:>4}")?;
    if layout.width == desc.width() && layout.height == desc.height() {
        out.set_color(&dflt)?;
    } else {
        out.set_color(&bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{}x{}", desc.width(), desc.height()),
        w = layout.size_digits
    )?;
    if desc.left() == 0 && desc.top() == 0 {
        out.set_color(&dflt)?;
    } else {
        out.set_color(&bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{},{}", desc.left(), desc.top()),
        w = layout.size_digits
    )?;
    let c = desc.local_colour_table_len();
    if c > 0 {
        out.set_color(&bold)?;
        write!(out, "  {c:3}")?;
    } else {
        out.set_color(&dflt)?;
        write!(out, " {:3}g", layout.global_clr)?;
    }
    match frame.transparent_colour() {
        Some(tc) => {
            out.set_color(&bold)?;
            write!(out, " {tc:>3}")?;
        }
        None => {
            out.set_color(&dflt)?;
            write!(out, " {:>3}", "-")?;
        }
    }
    let state = frame.consolidated_state();
    if state != ErrorState::OK {
        out.set_color(&red)?;
        write!(out, " {state:?}")?;
    }
    writeln!(out)?;
    Ok(())
}

/// Handle check subcommand
fn check(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let mut green = ColorSpec::new();
    green.set_fg(Some(Color::Green)).set_intense(true);
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    let mut dflt = ColorSpec::new();
    dflt.set_fg(Some(Color::White));
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            let gif = decode_file(path)?;
            let state = gif.consolidated_state();
            if state == ErrorState::OK {
                out.set_color(&green)?;
                writeln!(out, "{path:?}: ok")?;
                continue;
            }
            out.set_color(&red)?;
            writeln!(out, "{path:?}: {state:?}")?;
            out.set_color(&dflt)?;
            for msg in gif.consolidated_messages() {
                for line in msg.lines() {
                    writeln!(out, "  {line}")?;
                }
            }
        }
    }
    Ok(())
}

/// Handle recode subcommand
fn recode(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let gif = decode_file(path_arg(matches, "input")?)?;
    if gif.consolidated_state() != ErrorState::OK {
        log::warn!("recoding malformed GIF: {:?}", gif.consolidated_state());
    }
    let mut w = BufWriter::new(File::create(path_arg(matches, "output")?)?);
    gif.write_to_stream(&mut w)?;
    w.flush()?;
    Ok(())
}

/// Handle palette subcommand
fn palette(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let gif = decode_file(path_arg(matches, "input")?)?;
    let tbl = gif
        .global_colour_table()
        .ok_or("GIF has no global colour table")?;
    let palette = Palette::from_colour_table(tbl)?;
    let mut w = BufWriter::new(File::create(path_arg(matches, "output")?)?);
    palette.write_act(&mut w)?;
    w.flush()?;
    Ok(())
}

/// Calculate digits in a number
fn digits<T: Into<usize>>(v: T) -> usize {
    let v = v.into();
    match v {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1000..=9999 => 4,
        _ => 5,
    }
}
