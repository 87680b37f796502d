use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use ingest::{count_local_tree, words_from_reader};
use progress_core::DocumentPattern;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let (path, pattern) = match args.as_slice() {
        [path] => (path.as_str(), DocumentPattern::default()),
        [path, flag, pattern] if flag == "--pattern" => {
            let pattern = pattern.parse::<DocumentPattern>().unwrap_or_else(|err| {
                eprintln!("invalid pattern: {}", err);
                std::process::exit(2);
            });
            (path.as_str(), pattern)
        }
        _ => {
            eprintln!("usage: texcount <file|dir|-> [--pattern <glob>]");
            std::process::exit(2);
        }
    };

    if path == "-" {
        let words = words_from_reader(io::stdin().lock()).unwrap_or_else(|err| {
            eprintln!("failed to read stdin: {}", err);
            std::process::exit(1);
        });
        println!("words {}", words);
        return;
    }

    let target = Path::new(path);
    if target.is_dir() {
        let snapshot = count_local_tree(target, &pattern).unwrap_or_else(|err| {
            eprintln!("failed to count {}: {}", path, err);
            std::process::exit(1);
        });
        println!("files {}", snapshot.files);
        println!("words {}", snapshot.words);
        return;
    }

    let file = File::open(target).unwrap_or_else(|err| {
        eprintln!("failed to open {}: {}", path, err);
        std::process::exit(1);
    });
    let words = words_from_reader(BufReader::new(file)).unwrap_or_else(|err| {
        eprintln!("failed to read {}: {}", path, err);
        std::process::exit(1);
    });
    println!("words {}", words);
}
