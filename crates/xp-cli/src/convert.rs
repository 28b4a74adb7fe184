use std::fs;
use std::path::Path;

use tracing::{info, warn};
use xp_converter::{convert_file, KnownClasses, TranslateOptions};
use xp_core::ConvertError;

use crate::source_loader::{collect_sources, output_path, resolve_source};
use crate::{emit_error, map_cli_source_read, map_cli_target_write, ConvertArgs};

pub(crate) fn run_convert(args: ConvertArgs) -> Result<i32, ConvertError> {
    let options = build_options(&args)?;
    let root = resolve_source(&args.source)?;
    let sources = collect_sources(&root)?;

    if args.stdout {
        let [source] = sources.as_slice() else {
            return Err(ConvertError::new(
                "CLI_SOURCE_INVALID",
                "--stdout requires a single .xml file as source.",
            ));
        };
        let script = convert_file(&source.path, &options)?;
        print!("{}", script);
        return Ok(0);
    }

    let target = args.target.as_deref().map(Path::new);
    let mut failures = 0usize;
    for source in &sources {
        let destination = output_path(source, target);
        let result = convert_file(&source.path, &options)
            .and_then(|script| write_script(&destination, &script));
        match result {
            Ok(()) => {
                info!(source = %source.path.display(), output = %destination.display(), "converted");
                println!("CONVERTED:{}", destination.display());
            }
            Err(error) => {
                warn!(source = %source.path.display(), code = %error.code, "conversion failed");
                emit_error(&error);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Ok(1);
    }
    println!("RESULT:OK");
    println!("FILES:{}", sources.len());
    Ok(0)
}

fn build_options(args: &ConvertArgs) -> Result<TranslateOptions, ConvertError> {
    let mut known_classes = if args.no_builtin_classes {
        KnownClasses::empty()
    } else {
        KnownClasses::php_builtins()
    };
    if let Some(path) = &args.known_classes {
        let listing = fs::read_to_string(path).map_err(map_cli_source_read)?;
        known_classes.extend_from_list(&listing);
    }

    Ok(TranslateOptions {
        known_classes,
        max_nesting: args.max_nesting,
    })
}

fn write_script(path: &Path, script: &str) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(map_cli_target_write)?;
    }
    fs::write(path, script)
        .map_err(|error| map_cli_target_write(error).with_file(path.display().to_string()))
}

#[cfg(test)]
mod convert_tests {
    use super::*;
    use crate::cli_test_support::*;

    const SERVICES_XML: &str = r#"<container xmlns="http://symfony.com/schema/dic/services"><services><service id="clock" class="DateTimeImmutable"/></services></container>"#;

    fn args(source: &Path) -> ConvertArgs {
        ConvertArgs {
            source: source.to_string_lossy().to_string(),
            target: None,
            stdout: false,
            known_classes: None,
            no_builtin_classes: false,
            max_nesting: xp_converter::DEFAULT_MAX_NESTING,
            verbose: false,
        }
    }

    #[test]
    fn build_options_merges_known_class_file() {
        let root = temp_path("known-classes");
        let listing = root.join("classes.txt");
        write_file(&listing, "App\\Mailer\n# comment\n");

        let mut convert_args = args(&root);
        convert_args.known_classes = Some(listing.to_string_lossy().to_string());
        let options = build_options(&convert_args).expect("options");
        assert!(options.known_classes.contains("App\\Mailer"));
        assert!(options.known_classes.contains("stdClass"));

        convert_args.no_builtin_classes = true;
        let options = build_options(&convert_args).expect("options");
        assert!(!options.known_classes.contains("stdClass"));

        convert_args.known_classes = Some(root.join("absent.txt").to_string_lossy().to_string());
        assert_eq!(
            build_options(&convert_args).expect_err("missing listing").code,
            "CLI_SOURCE_READ"
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn run_convert_writes_php_next_to_source() {
        let root = temp_path("convert-in-place");
        write_file(&root.join("services.xml"), SERVICES_XML);

        let code = run_convert(args(&root)).expect("run");
        assert_eq!(code, 0);
        let script = fs::read_to_string(root.join("services.php")).expect("script written");
        assert!(script.contains("$services->set('clock', \\DateTimeImmutable::class);"));
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn run_convert_reports_failures_with_exit_code() {
        let root = temp_path("convert-failure");
        write_file(&root.join("good.xml"), SERVICES_XML);
        write_file(&root.join("bad.xml"), "<container/>");
        let out = root.join("out");

        let mut convert_args = args(&root);
        convert_args.target = Some(out.to_string_lossy().to_string());
        let code = run_convert(convert_args).expect("run");
        assert_eq!(code, 1);
        assert!(out.join("good.php").exists());
        assert!(!out.join("bad.php").exists());
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn stdout_mode_requires_single_file() {
        let root = temp_path("stdout-dir");
        write_file(&root.join("a.xml"), SERVICES_XML);
        let mut convert_args = args(&root);
        convert_args.stdout = true;
        assert_eq!(
            run_convert(convert_args).expect_err("directory").code,
            "CLI_SOURCE_INVALID"
        );
        let _ = fs::remove_dir_all(root);
    }
}
