use oxiarc_par2::{par2_create, par2_repair, par2_verify, write_repaired_files, Par2Options, Par2Verifier, ProtectedFile};

fn build_set(files: &[(&str, Vec<u8>)], redundancy: u32, block_size: usize) -> (Vec<ProtectedFile>, oxiarc_par2::Par2Archive) {
    let protected: Vec<ProtectedFile> =
        files.iter().map(|(name, data)| ProtectedFile { name: (*name).to_string(), data: data.clone() }).collect();
    let options = Par2Options::new(redundancy, block_size).unwrap();
    let archive = par2_create(&protected, &options).unwrap();
    (protected, archive)
}

#[test]
fn single_file_recovery_at_fifty_percent_redundancy() {
    let files = vec![
        ("notes.txt".to_string(), vec![b'X'; 1000]),
        ("photo.bin".to_string(), (0u16..500).map(|i| (i % 256) as u8).collect()),
    ];
    let (protected, archive) = build_set(&files, 50, 256);
    let verifier = Par2Verifier::parse(&[&archive.index_file, &archive.volume_file]).unwrap();

    // notes.txt is lost entirely; photo.bin survives untouched.
    let current: Vec<(String, Option<Vec<u8>>)> = vec![
        ("notes.txt".to_string(), None),
        ("photo.bin".to_string(), Some(protected[1].data.clone())),
    ];

    let report = par2_verify(&verifier, &current);
    assert!(report.repairable);
    assert!(!report.files[0].present);
    assert!(report.files[1].present && report.files[1].damaged_slices.is_empty());

    let repair = par2_repair(&verifier, &current).unwrap();
    assert!(repair.success);
    let (_, recovered) = repair.recovered.iter().find(|(n, _)| n == "notes.txt").unwrap();
    assert_eq!(recovered, &protected[0].data);

    let dir = tempfile::tempdir().unwrap();
    write_repaired_files(&repair, dir.path()).unwrap();
    assert_eq!(std::fs::read(dir.path().join("notes.txt")).unwrap(), protected[0].data);
}

#[test]
fn full_set_recovery_at_one_hundred_percent_redundancy() {
    let files: Vec<(String, Vec<u8>)> =
        (0..10).map(|i| (format!("part{i:02}.dat"), vec![i as u8; 128])).collect();
    let files_ref: Vec<(&str, Vec<u8>)> = files.iter().map(|(n, d)| (n.as_str(), d.clone())).collect();
    let (protected, archive) = build_set(&files_ref, 100, 128);
    let verifier = Par2Verifier::parse(&[&archive.index_file, &archive.volume_file]).unwrap();

    // Every single file is gone.
    let current: Vec<(String, Option<Vec<u8>>)> =
        protected.iter().map(|f| (f.name.clone(), None)).collect();

    let report = par2_verify(&verifier, &current);
    assert!(report.repairable);

    let repair = par2_repair(&verifier, &current).unwrap();
    assert!(repair.success, "unrecoverable: {:?}", repair.unrecoverable);
    for f in &protected {
        let (_, data) = repair.recovered.iter().find(|(n, _)| n == &f.name).unwrap();
        assert_eq!(data, &f.data, "file {} did not round-trip", f.name);
    }
}

#[test]
fn corrupted_slice_is_detected_and_not_reported_as_present() {
    let files = vec![("a.bin".to_string(), vec![7u8; 512])];
    let (_protected, archive) = build_set(&files, 50, 256);
    let verifier = Par2Verifier::parse(&[&archive.index_file, &archive.volume_file]).unwrap();

    let mut corrupted = vec![7u8; 512];
    corrupted[10] ^= 0xFF;
    let current = vec![("a.bin".to_string(), Some(corrupted))];
    let report = par2_verify(&verifier, &current);
    assert_eq!(report.files[0].damaged_slices, vec![0]);
}
