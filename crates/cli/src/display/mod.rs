use bp2bazel_core::{BazelFile, ConversionErrors};

/// Prints every file behind a `# <path>` banner.
pub fn print_build_files(files: &[BazelFile]) {
    for file in files {
        println!("# {}", file.path());
        println!("{}", file.contents);
        println!();
    }
}

pub fn print_conversion_errors(errors: &ConversionErrors) {
    eprintln!("❌ {}:", errors);
    for error in &errors.errors {
        eprintln!("   {}", error);
    }
}
