use std::path::Path;

/// Initialize logging to `log_file`, falling back to stderr if it cannot be
/// opened. `RUST_LOG` still overrides the default level.
pub fn init(log_file: &Path, verbose: bool) {
    use env_logger::Target;
    use std::fs;
    use std::io;

    let target = (|| -> io::Result<Target> {
        if let Some(dir) = log_file.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        Ok(Target::Pipe(Box::new(file)))
    })()
    .unwrap_or(Target::Stderr);

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(target)
        .init();
}
