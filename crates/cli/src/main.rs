use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use memmap2::Mmap;
use wilds_formats::fbxskel::Fbxskel;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Print the bone table of one or more skeleton files.
    Describe {
        /// Skeleton files (`<name>.fbxskel.7`).
        paths: Vec<PathBuf>,
    },
    /// Decode a skeleton file to JSON.
    Extract {
        path: PathBuf,

        /// File the JSON document is written to instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Encode a JSON skeleton into a skeleton file.
    Create {
        path: PathBuf,

        /// Output file; defaults to `<stem>.fbxskel.7` next to the input.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    match Cli::parse().command {
        Action::Describe { paths } => describe(&paths),
        Action::Extract { path, output } => extract(&path, output.as_deref()),
        Action::Create { path, output } => create(&path, output),
    }
}

fn read_skeleton(path: &Path) -> Result<Fbxskel, Box<dyn Error>> {
    let file = fs::File::open(path)?;

    // SAFETY: the mapping is read-only and stays private to this function.
    let data = unsafe { Mmap::map(&file)? };

    Ok(Fbxskel::parse(&data)?)
}

fn describe(paths: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    let mut failures = 0;

    for path in paths {
        match read_skeleton(path) {
            Ok(skeleton) => print_skeleton(path, &skeleton),
            Err(error) => {
                eprintln!("{}: {error}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} file(s) could not be read").into());
    }

    Ok(())
}

fn print_skeleton(path: &Path, skeleton: &Fbxskel) {
    println!("{} ({} bones)", path.display(), skeleton.bones.len());

    for (index, bone) in skeleton.bones.iter().enumerate() {
        let parent = match bone.parent() {
            Some(parent) => skeleton.bones[parent].name.as_str(),
            None => "<root>",
        };

        println!("  [{index:3}] {} (id {}, parent {parent})", bone.name, bone.id);
    }
}

fn extract(path: &Path, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let skeleton = read_skeleton(path)?;
    let json = serde_json::to_string_pretty(&skeleton)?;

    match output {
        Some(output) => fs::write(output, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

fn create(path: &Path, output: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let skeleton: Fbxskel = serde_json::from_str(&fs::read_to_string(path)?)?;
    let output = output.unwrap_or_else(|| path.with_extension("fbxskel.7"));

    fs::write(&output, skeleton.to_vec()?)?;
    println!("wrote {} ({} bones)", output.display(), skeleton.bones.len());

    Ok(())
}
