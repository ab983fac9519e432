//! # CLI Integration Tests
//!
//! This module provides tests for the command-line interface, covering
//! argument parsing for every subcommand and rejection of malformed values.

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::PathBuf;

    use crate::cli::{Cli, Commands, ConfigFormat, OutputFormat, TemplateType};
    use crate::grid::RegionQuery;

    /// Test basic CLI argument parsing
    #[test]
    fn test_cli_help() {
        let result = Cli::try_parse_from(["climviz", "--help"]);
        assert!(result.is_err()); // --help causes early exit with "error"

        let error = result.unwrap_err();
        assert!(error.to_string().contains("animated GIF"));
    }

    /// Test version argument
    #[test]
    fn test_cli_version() {
        let result = Cli::try_parse_from(["climviz", "--version"]);
        assert!(result.is_err());
    }

    /// Test global flags
    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["climviz", "--verbose", "template", "scalar"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);

        let result = Cli::try_parse_from(["climviz", "-v", "-q", "template", "scalar"]);
        assert!(result.is_err());
    }

    /// Test render command with datasets and steps
    #[test]
    fn test_render_command_basic() {
        let cli = Cli::parse_from([
            "climviz",
            "render",
            "--task",
            "wind",
            "--outputs",
            "out",
            "--mode",
            "vector",
            "--dataset",
            "u=data/u.grib",
            "--dataset",
            "v=data/v.grib",
            "--dataset",
            "w=data/w.grib",
            "--steps",
            "u=24",
            "--components",
            "u,v,w",
            "--frames-only",
        ]);

        if let Commands::Render(args) = &cli.command {
            assert_eq!(args.task, Some("wind".to_string()));
            assert_eq!(args.outputs, Some(PathBuf::from("out")));
            assert_eq!(args.mode, Some("vector".to_string()));
            assert_eq!(args.datasets.len(), 3);
            assert_eq!(args.datasets[1].name, "v");
            assert_eq!(args.datasets[1].path, PathBuf::from("data/v.grib"));
            assert_eq!(args.steps[0].count, 24);
            assert_eq!(args.components.as_ref().unwrap().w_component, "w");
            assert!(args.frames_only);
        } else {
            panic!("Expected Render command");
        }
    }

    /// Test region flags, including negative coordinates
    #[test]
    fn test_render_region_flags() {
        let cli = Cli::parse_from([
            "climviz", "render", "--task", "t2m", "--dataset", "t2m=t2m.nc", "--lat", "-33.5",
            "--lon", "-70", "--dlat", "5", "--dlon", "7.5",
        ]);

        if let Commands::Render(args) = &cli.command {
            assert_eq!(args.lat, Some(-33.5));
            assert_eq!(args.lon, Some(-70.0));

            let config = args.to_task_config().unwrap();
            assert_eq!(
                config.region_query().unwrap(),
                RegionQuery::Bounded {
                    center_lat: -33.5,
                    center_lon: -70.0,
                    half_height: 5.0,
                    half_width: 7.5,
                }
            );
        } else {
            panic!("Expected Render command");
        }
    }

    /// Partial region flags parse but fail when the region is resolved
    #[test]
    fn test_render_partial_region_is_ambiguous() {
        let cli = Cli::parse_from([
            "climviz", "render", "--task", "t2m", "--dataset", "t2m=t2m.nc", "--lat", "40",
        ]);

        if let Commands::Render(args) = &cli.command {
            let config = args.to_task_config().unwrap();
            assert!(config.region_query().is_err());
        } else {
            panic!("Expected Render command");
        }
    }

    /// Test invalid pair formats
    #[test]
    fn test_invalid_pairs() {
        let result = Cli::try_parse_from(["climviz", "render", "--dataset", "no_equals_sign"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["climviz", "render", "--steps", "u=many"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["climviz", "render", "--components", "u,v"]);
        assert!(result.is_err());
    }

    /// Test animate command parsing
    #[test]
    fn test_animate_command() {
        let cli = Cli::parse_from(["climviz", "animate", "--config", "wind.yaml", "--fps", "10"]);

        if let Commands::Animate { config, fps } = &cli.command {
            assert_eq!(config, &PathBuf::from("wind.yaml"));
            assert_eq!(fps, &Some(10));
        } else {
            panic!("Expected Animate command");
        }
    }

    /// Test info command parsing
    #[test]
    fn test_info_command() {
        let cli = Cli::parse_from(["climviz", "info", "t2m.nc", "-n", "t2m", "--format", "json"]);

        if let Commands::Info {
            file,
            variable,
            format,
        } = &cli.command
        {
            assert_eq!(file, &PathBuf::from("t2m.nc"));
            assert_eq!(variable, &Some("t2m".to_string()));
            assert_eq!(format, &OutputFormat::Json);
        } else {
            panic!("Expected Info command");
        }
    }

    #[test]
    fn test_info_default_format() {
        let cli = Cli::parse_from(["climviz", "info", "u100.grib"]);
        if let Commands::Info { variable, format, .. } = &cli.command {
            assert_eq!(variable, &None);
            assert_eq!(format, &OutputFormat::Human);
        } else {
            panic!("Expected Info command");
        }
    }

    /// Test template command parsing
    #[test]
    fn test_template_command() {
        let cli = Cli::parse_from([
            "climviz",
            "template",
            "vector",
            "--output",
            "wind.yaml",
            "--format",
            "yaml",
        ]);

        if let Commands::Template {
            template_type,
            output,
            format,
        } = &cli.command
        {
            assert_eq!(template_type, &TemplateType::Vector);
            assert_eq!(output, &Some(PathBuf::from("wind.yaml")));
            assert_eq!(format, &ConfigFormat::Yaml);
        } else {
            panic!("Expected Template command");
        }
    }

    #[test]
    fn test_template_rejects_unknown_type() {
        let result = Cli::try_parse_from(["climviz", "template", "contour"]);
        assert!(result.is_err());
    }

    /// Test completions command parsing
    #[test]
    fn test_completions_command() {
        let cli = Cli::parse_from(["climviz", "completions", "bash"]);
        if let Commands::Completions { shell, output } = &cli.command {
            assert_eq!(*shell, clap_complete::Shell::Bash);
            assert_eq!(output, &None);
        } else {
            panic!("Expected Completions command");
        }
    }

    /// Test that the command definition is internally consistent
    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
