#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use img_diff::{
        ensure_dirs, exit_code, find, mirror_path, BatchProcessor, BatchReport, Config, FileFailure, Fit,
        ImageDiffError, ImageProcessor, Walker, EXIT_FATAL, EXIT_FILE_FAILURES, EXIT_OK,
    };
    use std::fs;
    use std::path::{Path, PathBuf};

    fn write_image(path: &Path, width: u32, height: u32) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 3) as u8, (y * 3) as u8, 120])
        });
        img.save(path).unwrap();
    }

    fn extensions() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    fn relative_paths(root: &Path, recursive: bool, skip: &[&str]) -> Vec<PathBuf> {
        let skip: Vec<String> = skip.iter().map(|s| s.to_string()).collect();
        find(root, &skip, recursive, &extensions())
            .unwrap()
            .files
            .into_iter()
            .map(|f| f.relative)
            .collect()
    }

    #[test]
    fn test_walk_recursive_honors_skip_set() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_image(&root.join("a.jpg"), 4, 4);
        write_image(&root.join("sub/b.png"), 4, 4);
        write_image(&root.join("sub/deeper/c.JPG"), 4, 4);
        write_image(&root.join("node_modules/d.jpg"), 4, 4);
        write_image(&root.join("sub/node_modules/e.jpg"), 4, 4);
        temp_dir.child("notes.txt").write_str("not an image").unwrap();

        let found = relative_paths(root, true, &["node_modules"]);

        assert_eq!(
            found,
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("sub/b.png"),
                PathBuf::from("sub/deeper/c.JPG"),
            ]
        );
    }

    #[test]
    fn test_walk_non_recursive_stays_in_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_image(&root.join("b.png"), 4, 4);
        write_image(&root.join("a.jpg"), 4, 4);
        write_image(&root.join("sub/c.png"), 4, 4);
        fs::create_dir_all(root.join("folder.jpg")).unwrap();

        let found = relative_paths(root, false, &[]);

        assert_eq!(found, vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")]);
    }

    #[test]
    fn test_skip_set_matches_basename_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_image(&root.join("cache/a.jpg"), 4, 4);
        write_image(&root.join("x/cache/b.jpg"), 4, 4);
        write_image(&root.join("cache2/c.jpg"), 4, 4);

        let found = relative_paths(root, true, &["cache"]);

        assert_eq!(found, vec![PathBuf::from("cache2/c.jpg")]);
    }

    #[test]
    fn test_walk_depth_limit() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_image(&root.join("a.jpg"), 4, 4);
        write_image(&root.join("one/b.jpg"), 4, 4);
        write_image(&root.join("one/two/c.jpg"), 4, 4);

        let report = Walker::new(&extensions())
            .recursive(true)
            .with_max_depth(2)
            .find(root)
            .unwrap();

        assert_eq!(report.files.len(), 2);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_walk_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = find(&temp_dir.path().join("missing"), &[], true, &extensions());
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_reports_broken_entries_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_image(&root.join("a.jpg"), 4, 4);
        std::os::unix::fs::symlink(root.join("gone.jpg"), root.join("ghost.jpg")).unwrap();

        let report = find(root, &[], true, &extensions()).unwrap();

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.errors.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_survives_symlink_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_image(&root.join("a.jpg"), 4, 4);
        write_image(&root.join("sub/b.png"), 4, 4);
        std::os::unix::fs::symlink(root, root.join("sub/loop")).unwrap();

        let report = Walker::new(&extensions()).recursive(true).find(root).unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_mirror_path_preserves_nesting() {
        let mirrored = mirror_path(
            Path::new("/data/in"),
            Path::new("/data/out"),
            Path::new("/data/in/sub/b.png"),
        )
        .unwrap();

        assert_eq!(mirrored, PathBuf::from("/data/out/sub/b.png"));
    }

    #[test]
    fn test_mirror_path_root_name_repeated_deeper() {
        let mirrored = mirror_path(
            Path::new("/photos"),
            Path::new("/export"),
            Path::new("/photos/trip/photos/a.jpg"),
        )
        .unwrap();
        assert_eq!(mirrored, PathBuf::from("/export/trip/photos/a.jpg"));

        // A sibling sharing the root as a string prefix is not inside it.
        let outside = mirror_path(
            Path::new("/data/in"),
            Path::new("/data/out"),
            Path::new("/data/inbox/a.jpg"),
        );
        assert!(outside.is_err());
    }

    #[test]
    fn test_mirror_path_is_idempotent() {
        let input = Path::new("/data/in");
        let output = Path::new("/data/out");

        let once = mirror_path(input, output, Path::new("/data/in/sub/b.png")).unwrap();
        let twice = mirror_path(input, output, &once).unwrap();
        let from_relative = mirror_path(input, output, Path::new("sub/b.png")).unwrap();

        assert_eq!(once, twice);
        assert_eq!(once, from_relative);
    }

    #[test]
    fn test_mirror_path_rejects_traversal() {
        let result = mirror_path(Path::new("/data/in"), Path::new("/data/out"), Path::new("../escape.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn test_mirror_path_input_nested_in_output() {
        let mirrored = mirror_path(
            Path::new("/photos/raw"),
            Path::new("/photos"),
            Path::new("/photos/raw/a.png"),
        )
        .unwrap();
        assert_eq!(mirrored, PathBuf::from("/photos/a.png"));

        let deeper = mirror_path(
            Path::new("/photos/raw"),
            Path::new("/photos"),
            Path::new("/photos/raw/trip/b.jpg"),
        )
        .unwrap();
        assert_eq!(deeper, PathBuf::from("/photos/trip/b.jpg"));
    }

    #[test]
    fn test_ensure_dirs_twice() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("a/b/c/image.jpg");

        ensure_dirs(&target).unwrap();
        ensure_dirs(&target).unwrap();

        assert!(temp_dir.path().join("a/b/c").is_dir());
        assert!(!target.exists());
    }

    #[test]
    fn test_end_to_end_mirrors_tree() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        write_image(&input.join("a.jpg"), 80, 60);
        write_image(&input.join("sub/b.png"), 80, 60);
        write_image(&input.join("node_modules/c.jpg"), 80, 60);

        let config = Config {
            width: Some(40),
            ..Config::default()
        }
        .with_omitted(["node_modules"]);

        let processor = BatchProcessor::new(config, 2).unwrap();
        let report = processor.process_directory(&input, &output, true).unwrap();

        assert_eq!(report.discovered, 2);
        assert_eq!(report.processed, 2);
        assert!(!report.has_failures());
        assert!(output.join("a.jpg").exists());
        assert!(output.join("sub/b.png").exists());
        assert!(!output.join("node_modules/c.jpg").exists());

        assert_eq!(image::image_dimensions(output.join("a.jpg")).unwrap(), (40, 30));
        assert_eq!(image::image_dimensions(output.join("sub/b.png")).unwrap(), (40, 30));
    }

    #[test]
    fn test_output_inside_input_is_not_rescanned() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().to_path_buf();
        let output = input.join("out");
        write_image(&input.join("a.jpg"), 20, 20);
        write_image(&output.join("stale.jpg"), 20, 20);

        let processor = BatchProcessor::new(Config::default(), 1).unwrap();
        let report = processor.process_directory(&input, &output, true).unwrap();

        assert_eq!(report.discovered, 1);
        assert!(!output.join("out").exists());
    }

    #[test]
    fn test_input_nested_in_output_keeps_sources() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("photos");
        let input = output.join("raw");
        write_image(&input.join("a.png"), 80, 60);

        let config = Config {
            width: Some(40),
            ..Config::default()
        };
        let processor = BatchProcessor::new(config, 1).unwrap();
        let report = processor.process_directory(&input, &output, true).unwrap();

        assert_eq!(report.processed, 1);
        assert!(!report.has_failures());
        assert_eq!(image::image_dimensions(input.join("a.png")).unwrap(), (80, 60));
        assert_eq!(image::image_dimensions(output.join("a.png")).unwrap(), (40, 30));
    }

    #[test]
    fn test_input_subdir_named_like_output_is_processed() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        write_image(&input.join("out/a.jpg"), 20, 20);
        write_image(&input.join("b.jpg"), 20, 20);

        let processor = BatchProcessor::new(Config::default(), 1).unwrap();
        let report = processor.process_directory(&input, &output, true).unwrap();

        assert_eq!(report.discovered, 2);
        assert_eq!(report.processed, 2);
        assert!(output.join("out/a.jpg").exists());
        assert!(output.join("b.jpg").exists());
    }

    #[test]
    fn test_corrupt_file_does_not_stop_batch() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        write_image(&input.join("a.jpg"), 30, 30);
        temp_dir.child("in/corrupt.jpg").write_str("definitely not a jpeg").unwrap();

        let processor = BatchProcessor::new(Config::default(), 2).unwrap();
        let report = processor.process_directory(&input, &output, false).unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("corrupt.jpg"));
        assert!(output.join("a.jpg").exists());
        assert!(!output.join("corrupt.jpg").exists());
    }

    #[test]
    fn test_same_input_and_output_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let processor = BatchProcessor::new(Config::default(), 1).unwrap();
        let result = processor.process_directory(temp_dir.path(), temp_dir.path(), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_exit_code_mapping() {
        let clean: Result<BatchReport, ImageDiffError> = Ok(BatchReport {
            discovered: 2,
            processed: 2,
            ..BatchReport::default()
        });
        assert_eq!(exit_code(&clean), EXIT_OK);

        let failed: Result<BatchReport, ImageDiffError> = Ok(BatchReport {
            discovered: 2,
            processed: 1,
            failures: vec![FileFailure {
                path: PathBuf::from("in/corrupt.jpg"),
                message: "decode error".to_string(),
            }],
            ..BatchReport::default()
        });
        assert_eq!(exit_code(&failed), EXIT_FILE_FAILURES);

        let fatal: Result<BatchReport, ImageDiffError> =
            Err(ImageDiffError::ConfigConflict("width, height and aspect ratio all set".to_string()));
        assert_eq!(exit_code(&fatal), EXIT_FATAL);

        assert_eq!((EXIT_OK, EXIT_FILE_FAILURES, EXIT_FATAL), (0, 1, 2));
    }

    #[test]
    fn test_exit_code_for_batch_with_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        temp_dir.child("in/corrupt.png").write_str("nope").unwrap();

        let processor = BatchProcessor::new(Config::default(), 1).unwrap();
        let outcome = processor.process_directory(&input, &temp_dir.path().join("out"), false);
        assert_eq!(exit_code(&outcome), EXIT_FILE_FAILURES);

        let missing = processor.process_directory(&temp_dir.path().join("missing"), &temp_dir.path().join("out"), false);
        assert_eq!(exit_code(&missing), EXIT_FATAL);
    }

    #[test]
    fn test_contain_output_has_box_dimensions() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.child("wide.png");
        write_image(input_path.path(), 80, 40);
        let output_path = temp_dir.child("wide_out.png");

        let config = Config {
            width: Some(50),
            height: Some(50),
            fit: Fit::Contain,
            ..Config::default()
        };
        let processor = ImageProcessor::new(&config);
        processor.process(input_path.path(), output_path.path()).unwrap();

        assert_eq!(image::image_dimensions(output_path.path()).unwrap(), (50, 50));
    }

    #[test]
    fn test_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let processor = ImageProcessor::new(&Config::default());

        let result = processor.process(
            &temp_dir.path().join("nonexistent.jpg"),
            &temp_dir.path().join("output.jpg"),
        );

        assert!(result.is_err());
    }
}
