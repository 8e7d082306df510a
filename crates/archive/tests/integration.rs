//! Integration tests for archive repacking

#[cfg(test)]
mod tests {
    use rvx_archive::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    fn stored() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    }

    fn deflated() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8], SimpleFileOptions)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, bytes, options) in entries {
            writer.start_file(*name, *options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_repack_keeps_untouched_entries_identical() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.apk");
        let resources = dir.path().join("resources.apk");
        let patched = dir.path().join("patched.apk");

        let native: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        write_zip(
            &input,
            &[
                ("AndroidManifest.xml", b"original manifest", deflated()),
                ("classes.dex", b"original dex", deflated()),
                ("resources.arsc", b"original table", stored()),
                ("lib/arm64-v8a/libnative.so", &native, stored()),
                ("assets/readme.txt", b"untouched asset", deflated()),
            ],
        );
        write_zip(
            &resources,
            &[
                ("AndroidManifest.xml", b"rebuilt manifest", deflated()),
                ("resources.arsc", b"rebuilt table", stored()),
            ],
        );

        let mut repacker = Repacker::create(&patched).unwrap();
        assert!(repacker
            .add_entry_compressed("classes.dex", b"patched dex")
            .unwrap());
        assert!(!repacker.add_entry_compressed("classes.dex", b"again").unwrap());
        let from_resources = repacker
            .copy_entries_aligned(&resources, entry_alignment)
            .unwrap();
        let from_input = repacker.copy_entries_aligned(&input, entry_alignment).unwrap();
        assert_eq!(from_resources, 2);
        assert_eq!(from_input, 2);
        assert_eq!(repacker.len(), 5);
        repacker.finish().unwrap();

        assert_eq!(read_entry(&patched, "classes.dex").unwrap(), b"patched dex");
        assert_eq!(
            read_entry(&patched, "AndroidManifest.xml").unwrap(),
            b"rebuilt manifest"
        );
        assert_eq!(read_entry(&patched, "resources.arsc").unwrap(), b"rebuilt table");
        assert_eq!(
            read_entry(&patched, "assets/readme.txt").unwrap(),
            b"untouched asset"
        );
        assert_eq!(
            read_entry(&patched, "lib/arm64-v8a/libnative.so").unwrap(),
            native
        );
    }

    #[test]
    fn test_stored_entries_stay_stored_and_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.apk");
        let patched = dir.path().join("patched.apk");
        write_zip(
            &input,
            &[
                ("a.txt", b"odd length!", stored()),
                ("lib/x86_64/libfoo.so", b"\x7fELF....", stored()),
                ("classes.dex", b"dex", deflated()),
            ],
        );

        let mut repacker = Repacker::create(&patched).unwrap();
        repacker.copy_entries_aligned(&input, entry_alignment).unwrap();
        repacker.finish().unwrap();

        let entries = list_entries(&patched).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "lib/x86_64/libfoo.so", "classes.dex"]);
        assert!(!entries[0].compressed);
        assert!(!entries[1].compressed);
        assert!(entries[2].compressed);

        let mut archive = zip::ZipArchive::new(File::open(&patched).unwrap()).unwrap();
        let so = archive.by_name("lib/x86_64/libfoo.so").unwrap();
        assert_eq!(so.data_start() % 4096, 0);
    }

    #[test]
    fn test_read_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.apk");
        write_zip(&input, &[("a", b"a", stored())]);
        assert!(read_entry(&input, "b").is_err());
    }

    #[test]
    fn test_open_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let mut repacker = Repacker::create(&dir.path().join("out.apk")).unwrap();
        let err = repacker
            .copy_entries_aligned(&dir.path().join("missing.apk"), entry_alignment)
            .unwrap_err();
        assert!(err.to_string().contains("missing.apk"));
    }
}
