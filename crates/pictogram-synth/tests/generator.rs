use image::{Rgb, RgbImage};
use nalgebra::Point2;
use pictogram_synth::{
    Balls, BatchGenerator, Blur, Candidate, Catalog, CatalogEntry, DirImageSource,
    FactorSelection, GeneratorConfig, Glare, Lighting, PictogramKind, Plan, PrintQuality, Quad,
    Step, Surrounding,
};
use std::collections::HashSet;
use std::path::Path;

const PICTO: Rgb<u8> = Rgb([220, 30, 30]);
const PAPER: Rgb<u8> = Rgb([40, 40, 200]);

/// 24x24 photo with a solid pictogram in the square [8, 16).
fn photo() -> RgbImage {
    RgbImage::from_fn(24, 24, |x, y| {
        if (8..16).contains(&x) && (8..16).contains(&y) {
            PICTO
        } else {
            PAPER
        }
    })
}

fn write_photo(root: &Path, entry: &CatalogEntry, img: &RgbImage) {
    let path = root.join(entry.relative_path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    img.save(path).unwrap();
}

fn entry(kind: PictogramKind, name: &str, coords: &str) -> CatalogEntry {
    CatalogEntry {
        category: kind.as_str().to_string(),
        file_name: name.to_string(),
        kind,
        glare: Glare::PlexiglassCover,
        lighting: Lighting::Poor,
        print_quality: PrintQuality::Good,
        blur: Blur::None,
        balls: Balls::None,
        quad: None,
        perspective: None,
    }
    .with_flat_coords(coords)
    .expect("valid coords")
}

struct Dataset {
    _dir: tempfile::TempDir,
    root: std::path::PathBuf,
    catalog: Catalog,
}

fn dataset() -> Dataset {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let entries = vec![
        entry(PictogramKind::Left, "l0.png", "8,8,16,8,16,16,8,16"),
        entry(PictogramKind::Left, "l1.png", "16,16,8,16,8,8,16,8"),
        entry(PictogramKind::Center, "c0.png", "8,16,8,8,16,8,16,16"),
        entry(PictogramKind::Center, "c1.png", ""),
        entry(PictogramKind::Right, "r0.png", "8,8,8,16,16,16,16,8"),
    ];
    for e in &entries {
        write_photo(&root, e, &photo());
    }
    Dataset {
        _dir: dir,
        root,
        catalog: Catalog::new(entries),
    }
}

fn config(batch_size: usize, loops: Option<usize>) -> GeneratorConfig {
    GeneratorConfig {
        batch_size,
        loops,
        target: PictogramKind::Center,
        output_size: [24, 24],
        seed: Some(2024),
        drop_last: false,
        crop_picture_background: false,
    }
}

#[test]
fn full_run_over_photos_on_disk() {
    pictogram_core::init_with_level(log::LevelFilter::Warn).unwrap();
    let ds = dataset();
    let plan = Plan::build(&FactorSelection::default(), &ds.catalog);
    assert!(plan.combinations().iter().all(|c| !c.pool.is_empty()));
    // 3 kinds x 4 surroundings, all under the same recorded conditions
    assert_eq!(plan.len(), 12);

    let generator = BatchGenerator::new(
        &ds.catalog,
        plan,
        DirImageSource::new(&ds.root),
        config(5, Some(2)),
    )
    .unwrap();

    let mut seen_labels = HashSet::new();
    let mut total = 0;
    for batch in generator {
        assert!(batch.len() <= 5);
        assert_eq!(batch.images.len(), batch.labels.len());
        for (label, origin) in batch.labels.iter().zip(&batch.origins) {
            assert!(*label == 0.0 || *label == 1.0);
            assert_eq!(*label == 1.0, origin.factors.kind == PictogramKind::Center);
            seen_labels.insert(label.to_bits());
        }
        total += batch.len();
    }
    assert_eq!(seen_labels.len(), 2);
    // right has a single photo, so each epoch is one sweep of 12 draws. Draws
    // that need c1's missing location are skipped: black, noise and the three
    // mismatch combinations, at most 5 per epoch.
    assert!((14..=24).contains(&total), "total = {total}");
}

#[test]
fn black_surrounding_keeps_only_the_pictogram() {
    let ds = dataset();
    let sel = FactorSelection::default()
        .with_kinds([PictogramKind::Right])
        .with_surroundings([Surrounding::Black]);
    let plan = Plan::build(&sel, &ds.catalog);
    let mut generator = BatchGenerator::new(
        &ds.catalog,
        plan,
        DirImageSource::new(&ds.root),
        config(1, Some(1)),
    )
    .unwrap();

    let Step::Batch(batch) = generator.next_batch() else {
        panic!("expected one sample");
    };
    let img = &batch.images[0];
    assert_eq!(img.get_pixel(12, 12).0, [220.0, 30.0, 30.0]);
    assert_eq!(img.get_pixel(2, 2).0, [0.0, 0.0, 0.0]);
    assert_eq!(batch.labels, vec![0.0]);
    assert!(matches!(generator.next_batch(), Step::Exhausted));
}

#[test]
fn mismatch_pastes_pictogram_into_other_photo() {
    let dir = tempfile::tempdir().unwrap();
    // foreground pictogram sits top-left; background location is bottom-right
    let fg = entry(PictogramKind::Left, "fg.png", "0,0,0,8,8,8,8,0");
    let mut bg = entry(PictogramKind::Right, "bg.png", "");
    bg.quad = Some(Quad::canonical([
        Point2::new(16.0, 16.0),
        Point2::new(16.0, 24.0),
        Point2::new(24.0, 24.0),
        Point2::new(24.0, 16.0),
    ]));
    let fg_img = RgbImage::from_fn(24, 24, |x, y| if x < 8 && y < 8 { PICTO } else { PAPER });
    let bg_img = RgbImage::from_pixel(24, 24, Rgb([10, 160, 10]));
    write_photo(dir.path(), &fg, &fg_img);
    write_photo(dir.path(), &bg, &bg_img);
    let catalog = Catalog::new(vec![fg, bg]);

    let sel = FactorSelection::default()
        .with_kinds([PictogramKind::Left])
        .with_surroundings([Surrounding::MismatchBackground]);
    let plan = Plan::build(&sel, &catalog);
    assert_eq!(plan.combinations()[0].pool.len(), 2);

    let batches: Vec<_> = BatchGenerator::new(
        &catalog,
        plan,
        DirImageSource::new(dir.path()),
        GeneratorConfig {
            target: PictogramKind::Left,
            ..config(4, Some(1))
        },
    )
    .unwrap()
    .collect();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.len(), 2);
    assert!(batch.labels.iter().all(|&l| l == 1.0));

    let pasted = batch
        .origins
        .iter()
        .position(|o| {
            o.candidate
                == Candidate::Pair {
                    foreground: 0,
                    background: 1,
                }
        })
        .expect("pair drawn");
    let img = &batch.images[pasted];
    assert_eq!(img.get_pixel(20, 20).0, [220.0, 30.0, 30.0]);
    assert_eq!(img.get_pixel(4, 4).0, [10.0, 160.0, 10.0]);
}

#[test]
fn missing_files_do_not_stop_the_run() {
    let ds = dataset();
    std::fs::remove_file(ds.root.join("left").join("l1.png")).unwrap();
    let sel = FactorSelection::default()
        .with_kinds([PictogramKind::Left])
        .with_surroundings([Surrounding::PictureBackground]);
    let plan = Plan::build(&sel, &ds.catalog);
    let total: usize = BatchGenerator::new(
        &ds.catalog,
        plan,
        DirImageSource::new(&ds.root),
        config(8, Some(4)),
    )
    .unwrap()
    .map(|b| b.len())
    .sum();
    // two draws per epoch, one of which always fails to load
    assert_eq!(total, 4);
}
