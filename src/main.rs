//! Punto de entrada ("driver").
//!
//! Este crate no analiza código CTL, por lo que la CLI se limita a
//! emitir la unidad de biblioteca estándar de un dialecto, o su
//! encabezado, para compilarla junto al código que otro driver genere.

use anyhow::{self, bail, Context};
use clap::{self, crate_version, Arg, Command};
use ctlcc::{
    codegen::{EmitMode, Generator},
    dialect::{Language, Precision},
    error::Codegen,
};

use std::{
    fs::File,
    io::{self, Write},
    str::FromStr,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parsing de CLI
    let args = Command::new("CTL code generator")
        .version(crate_version!())
        .arg(
            Arg::new("dialect")
                .short('d')
                .long("dialect")
                .value_name("LANGUAGE")
                .takes_value(true)
                .default_value("c++11")
                .help("Target language"),
        )
        .arg(
            Arg::new("precision")
                .short('p')
                .long("precision")
                .value_name("PRECISION")
                .takes_value(true)
                .default_value("float")
                .help("Numeric precision of ctl_number_t"),
        )
        .arg(
            Arg::new("header")
                .long("header")
                .help("Emit declarations instead of definitions"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .takes_value(true)
                .value_name("FILE")
                .default_value("-")
                .help("Output file ('-' for stdout)"),
        )
        .get_matches();

    let language = args.value_of("dialect").context("Missing target language")?;
    let language = Language::from_str(language).context("Bad target language")?;

    let precision = args.value_of("precision").context("Missing precision")?;
    let precision = Precision::from_str(precision).context("Bad precision")?;

    let header = args.is_present("header");
    let output = args.value_of("output").context("Missing output file")?;

    let text = match generate(language, precision, header) {
        Ok(text) => text,
        Err(error) => bail!("{}", error.into_diagnostics().to_string().trim_end()),
    };

    match output {
        "-" => io::stdout()
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?,

        path => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to open for writing: {}", path))?;

            file.write_all(text.as_bytes())
                .with_context(|| format!("Failed to write to file: {}", path))?;
        }
    }

    Ok(())
}

fn generate(language: Language, precision: Precision, header: bool) -> Codegen<String> {
    let mut generator = Generator::new(language);
    generator.set_precision(precision)?;
    generator.init_std_library()?;

    log::info!("Emitting standard library for {} ({})", language, precision);

    if header {
        generator.header_code()
    } else {
        let mut text = generator.std_library_and_setup()?;
        text.push_str(&generator.code(EmitMode::All)?);
        Ok(text)
    }
}
