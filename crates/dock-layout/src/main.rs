use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use term_dock::layout::{DockLayoutComposition, DockSituation, LayoutFile, LayoutInfo, Setting};
use term_dock::{DockResult, tracing_sub};

#[derive(Parser, Debug)]
#[command(
    name = "dock-layout",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect and convert term-dock layout files"
)]
struct Cli {
    /// Log parsing details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the settings and the structure of every root.
    Show {
        file: PathBuf,
    },
    /// Rewrite a layout file in the other encoding.
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = Encoding::Xml)]
        to: Encoding,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Encoding {
    Binary,
    Xml,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_sub::init(if cli.verbose { Level::DEBUG } else { Level::WARN });
    match run(cli.command) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("dock-layout: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> DockResult<String> {
    // Unknown factories are kept as raw payloads, so any file converts
    // without the application's factories.
    let situation = DockSituation::new();
    match command {
        Command::Show { file } => {
            let layout = LayoutFile::parse(&situation, &fs::read(&file)?)?;
            Ok(describe(&layout))
        }
        Command::Convert { input, output, to } => {
            let layout = LayoutFile::parse(&situation, &fs::read(&input)?)?;
            let bytes = match to {
                Encoding::Binary => layout.to_bytes(&situation)?,
                Encoding::Xml => layout.to_xml_string(&situation)?.into_bytes(),
            };
            fs::write(&output, bytes)?;
            Ok(format!("wrote {}\n", output.display()))
        }
    }
}

fn describe(file: &LayoutFile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "current: {}", file.current.as_deref().unwrap_or("-"));
    for (name, setting) in &file.settings {
        let _ = writeln!(out, "setting {name}");
        describe_setting(&mut out, setting);
    }
    let _ = writeln!(out, "live");
    describe_setting(&mut out, &file.live);
    out
}

fn describe_setting(out: &mut String, setting: &Setting) {
    for (root, composition) in &setting.roots {
        let _ = writeln!(out, "  root {root}");
        describe_composition(out, composition, 2);
    }
    for entry in &setting.invisible {
        let location = match (&entry.root, &entry.location) {
            (Some(root), Some(path)) => format!("{root}:{path}"),
            (Some(root), None) => root.clone(),
            _ => "-".to_string(),
        };
        let _ = writeln!(out, "  hidden {} at {location}", entry.key);
    }
    if let Some(modes) = &setting.modes {
        for (key, entry) in &modes.entries {
            let _ = writeln!(out, "  mode {key} = {}", entry.mode);
        }
    }
}

fn describe_composition(out: &mut String, composition: &DockLayoutComposition, depth: usize) {
    let indent = "  ".repeat(depth);
    let detail = match &composition.layout {
        LayoutInfo::Data { data, .. } => data
            .title()
            .map(|title| format!(" \"{title}\""))
            .or_else(|| {
                composition
                    .single_ids()
                    .first()
                    .map(|id| format!(" #{id}"))
            })
            .unwrap_or_default(),
        LayoutInfo::Bytes { bytes, .. } => format!(" (raw, {} bytes)", bytes.len()),
        LayoutInfo::Xml { .. } => " (raw xml)".to_string(),
    };
    let _ = writeln!(out, "{indent}{}{detail}", composition.factory());
    for child in &composition.children {
        describe_composition(out, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use indoc::indoc;
    use term_dock::layout::LayoutData;

    use super::*;

    fn sample() -> LayoutFile {
        let root = DockLayoutComposition::new(
            LayoutInfo::Data {
                factory: "stack".into(),
                data: LayoutData::Stack {
                    title: "tabs".into(),
                    selected: Some(0),
                    placeholders: BTreeMap::new(),
                },
            },
            vec![
                DockLayoutComposition::leaf("single", LayoutData::Single { id: "editor".into() }),
                DockLayoutComposition::new(
                    LayoutInfo::Bytes {
                        factory: "chart".into(),
                        bytes: vec![7, 7],
                    },
                    Vec::new(),
                ),
            ],
        );
        LayoutFile {
            current: None,
            settings: BTreeMap::new(),
            live: Setting {
                roots: BTreeMap::from([("main".to_string(), root)]),
                ..Setting::default()
            },
        }
    }

    #[test]
    fn show_prints_structure() {
        let expected = indoc! {r#"
            current: -
            live
              root main
                stack "tabs"
                  single #editor
                  chart (raw, 2 bytes)
        "#};
        assert_eq!(describe(&sample()), expected);
    }

    #[test]
    fn convert_binary_to_xml_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let situation = DockSituation::new();
        let binary = dir.path().join("layout.bin");
        let xml = dir.path().join("layout.xml");
        let back = dir.path().join("back.bin");
        fs::write(&binary, sample().to_bytes(&situation).unwrap()).unwrap();

        run(Command::Convert {
            input: binary.clone(),
            output: xml.clone(),
            to: Encoding::Xml,
        })
        .unwrap();
        assert!(fs::read_to_string(&xml).unwrap().contains("<frontend"));

        run(Command::Convert {
            input: xml,
            output: back.clone(),
            to: Encoding::Binary,
        })
        .unwrap();
        assert_eq!(fs::read(&back).unwrap(), fs::read(&binary).unwrap());
    }
}
