use c_assess_inf::{answer::GroundTruth, compute_score, RewardConfig};
use f_finetune::{
    materialize::{materialize_split, read_split, MaterializeOptions},
    split::{plan_splits, QaItem, Split, SplitRatio},
};
use image::{GenericImageView, Rgb, RgbImage};
use indicatif::ProgressBar;
use serde_json::json;
use std::path::Path;

fn write_image(path: &Path, w: u32, h: u32) {
    let mut img = RgbImage::new(w, h);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = Rgb([(x * 5 % 256) as u8, (y * 5 % 256) as u8, 128]);
    }
    img.save(path).unwrap();
}

fn qa(id: usize, file_path: &str, answer: &str) -> QaItem {
    serde_json::from_value(json!({
        "id": id,
        "image_id": format!("ad_{id}"),
        "question": "How clear is the promotional purpose of this advertisement?",
        "answer": answer,
        "question_type": "ads",
        "file_path": file_path,
    }))
    .unwrap()
}

#[test]
fn split_records_round_into_reward_ground_truth() {
    let dir = tempfile::tempdir().unwrap();
    let img = dir.path().join("ad.png");
    write_image(&img, 40, 30);

    let items = vec![
        qa(1, img.to_str().unwrap(), "Good"),
        qa(2, "/definitely/not/here.png", "Good"),
    ];
    let opts = MaterializeOptions {
        out_dir: dir.path().join("out"),
        resize: 16,
        with_prompt: false,
    };

    let report = materialize_split(Split::Train, &items, &opts, &ProgressBar::hidden()).unwrap();
    assert_eq!((report.written, report.missing, report.unreadable), (1, 1, 0));

    let split_dir = opts.out_dir.join("train");
    let records = read_split(&split_dir).unwrap();
    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec.id, "1");
    assert_eq!((rec.img_width, rec.img_height), (40, 30));
    assert_eq!((rec.resized_width, rec.resized_height), (16, 16));

    let resized = image::open(split_dir.join(&rec.image)).unwrap();
    assert_eq!(resized.dimensions(), (16, 16));

    let truth = GroundTruth::parse(&rec.solution).unwrap();
    assert_eq!(truth.answer, json!("Good"));

    let predict = r#"<think>Clean layout and a clear slogan.</think><answer>[{"answer":"Good","confidence":0.9,"answer_type":"ads"}]</answer>"#;
    let score = compute_score(predict, &rec.solution, &RewardConfig::calibrated());
    assert!((score - 2.469).abs() < 1e-9);
}

#[test]
fn unreadable_images_are_counted() {
    let dir = tempfile::tempdir().unwrap();
    let junk = dir.path().join("junk.png");
    std::fs::write(&junk, b"not an image").unwrap();

    let opts = MaterializeOptions {
        out_dir: dir.path().join("out"),
        resize: 8,
        with_prompt: true,
    };
    let report = materialize_split(
        Split::Val,
        &[qa(5, junk.to_str().unwrap(), "Bad")],
        &opts,
        &ProgressBar::hidden(),
    )
    .unwrap();
    assert_eq!((report.written, report.unreadable), (0, 1));
    assert!(read_split(&opts.out_dir.join("val")).unwrap().is_empty());
}

#[test]
fn prompt_mode_wraps_question() {
    let dir = tempfile::tempdir().unwrap();
    let img = dir.path().join("ad.png");
    write_image(&img, 8, 8);

    let items: Vec<QaItem> = (0..10).map(|i| qa(i, img.to_str().unwrap(), "Fair")).collect();
    let plan = plan_splits(items, SplitRatio::default(), 2025, None);
    let opts = MaterializeOptions {
        out_dir: dir.path().join("out"),
        resize: 4,
        with_prompt: true,
    };
    for split in Split::ALL {
        materialize_split(split, plan.items(split), &opts, &ProgressBar::hidden()).unwrap();
    }

    let train = read_split(&opts.out_dir.join("train")).unwrap();
    let test = read_split(&opts.out_dir.join("test")).unwrap();
    assert_eq!((train.len(), test.len()), (8, 1));
    assert!(train[0].problem.starts_with("<image>\nHow clear is the promotional purpose"));
    assert!(train[0].problem.contains("OUTPUT (STRICT)"));
}
