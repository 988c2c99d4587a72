use std::path::{Path, PathBuf};

use menu_render::{
    load_menu_table, render_menu, AppConfig, BlockRole, CoordinateSystem, MenuSession,
    OutputFormat, RenderErrorKind, RenderWarning,
};

const MENU_JSON: &str = r#"[
    { "Name": "Rosół", "Category": "Zupy", "Description": "Klarowny bulion drobiowy z domowym makaronem, marchewką i natką pietruszki" },
    { "Name": "Żurek", "Category": "Zupy", "Description": "Na zakwasie z białą kiełbasą i jajkiem" },
    { "Name": "Schabowy", "Category": "Dania główne", "Description": "Kotlet schabowy z ziemniakami i kapustą zasmażaną" },
    { "Name": "Sernik", "Category": "Desery", "Description": "Sernik wiedeński" }
]"#;

const FONT_CANDIDATES: &[&str] = &[
    "fonts/Argent.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn test_font_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("MENU_RENDER_TEST_FONT") {
        return Some(PathBuf::from(path));
    }
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

fn write_menu(dir: &Path) -> PathBuf {
    let path = dir.join("menu_data.json");
    std::fs::write(&path, MENU_JSON).unwrap();
    path
}

fn config(dir: &Path, font: PathBuf, output: &str) -> AppConfig {
    let mut cfg = AppConfig {
        data_file: write_menu(dir),
        output: dir.join(output),
        background: None,
        ..AppConfig::default()
    };
    cfg.fonts.insert("Argent".to_string(), font);
    cfg
}

#[test]
fn table_loads_from_configured_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), PathBuf::from("unused.ttf"), "menu.png");
    let table = load_menu_table(&cfg).unwrap();
    assert_eq!(table.len(), 4);
    let categories: Vec<&str> = table.categories().into_iter().collect();
    assert_eq!(categories, vec!["Dania główne", "Desery", "Zupy"]);
}

#[test]
fn unknown_dish_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), PathBuf::from("unused.ttf"), "menu.png");
    let table = load_menu_table(&cfg).unwrap();
    let err = render_menu(&["Soup", "Rosół"], &table, &cfg).unwrap_err();
    assert_eq!(err.kind(), RenderErrorKind::UnknownDish);
    assert!(err.to_string().contains("Available: Rosół, Żurek, Schabowy, Sernik"));
    assert!(!cfg.output.exists());
}

#[test]
fn missing_data_file_is_data_source_missing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppConfig {
        data_file: dir.path().join("absent.json"),
        ..AppConfig::default()
    };
    assert_eq!(
        load_menu_table(&cfg).unwrap_err().kind(),
        RenderErrorKind::DataSourceMissing
    );
}

#[test]
fn png_render_groups_categories_and_warns_on_missing_background() {
    let Some(font) = test_font_path() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), font, "menu.png");
    let background = dir.path().join("missing_background.png");
    cfg.background = Some(background.clone());
    let table = load_menu_table(&cfg).unwrap();

    let outcome = render_menu(&["Sernik", "Rosół", "Żurek"], &table, &cfg).unwrap();
    assert_eq!(outcome.format, OutputFormat::Png);
    assert_eq!(
        outcome.warnings,
        vec![RenderWarning::BackgroundMissing(background)]
    );
    assert_eq!(outcome.page.coordinate_system, CoordinateSystem::TopDown);

    let titles: Vec<&str> = outcome
        .page
        .texts_with_role(BlockRole::CategoryTitle)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(titles, vec!["Desery", "Zupy"]);
    let names: Vec<&str> = outcome
        .page
        .texts_with_role(BlockRole::DishName)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(names, vec!["Sernik", "Rosół", "Żurek"]);

    let decoded = image::open(&outcome.output).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (419, 596));
}

#[test]
fn blank_png_canvas_keeps_reference_layout_unscaled() {
    let Some(font) = test_font_path() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), font, "menu.png");
    let table = load_menu_table(&cfg).unwrap();

    let outcome = render_menu(&["Rosół"], &table, &cfg).unwrap();
    assert_eq!(outcome.page.width, 419.25);
    assert_eq!(outcome.page.height, 595.5);
    let title = outcome
        .page
        .texts_with_role(BlockRole::CategoryTitle)
        .next()
        .unwrap();
    assert_eq!(title.size, 25.0);
    assert_eq!(title.y, outcome.page.metrics.start_y);
}

#[test]
fn png_canvas_follows_background_size() {
    let Some(font) = test_font_path() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), font, "menu.png");
    let background = dir.path().join("bg.png");
    image::RgbaImage::from_pixel(839, 1191, image::Rgba([240, 230, 210, 255]))
        .save(&background)
        .unwrap();
    cfg.background = Some(background);
    let table = load_menu_table(&cfg).unwrap();

    let outcome = render_menu(&["Schabowy"], &table, &cfg).unwrap();
    assert!(outcome.warnings.is_empty());
    assert!((outcome.page.width - 839.0).abs() < 0.01);
    assert!((outcome.page.height - 1191.0).abs() < 0.01);
    let decoded = image::open(&outcome.output).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (839, 1191));
}

#[test]
fn pdf_render_uses_bottom_up_baselines() {
    let Some(font) = test_font_path() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), font, "menu.pdf");
    let table = load_menu_table(&cfg).unwrap();

    let outcome = render_menu(&["Rosół", "Schabowy"], &table, &cfg).unwrap();
    assert_eq!(outcome.format, OutputFormat::Pdf);
    assert_eq!(outcome.page.coordinate_system, CoordinateSystem::BottomUp);
    let ys: Vec<f32> = outcome.page.text_commands().map(|t| t.y).collect();
    assert!(ys.windows(2).all(|w| w[0] > w[1]));

    let bytes = std::fs::read(&outcome.output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn session_reports_saved_output() {
    let Some(font) = test_font_path() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), font, "menu.png");
    let output = cfg.output.clone();
    let table = load_menu_table(&cfg).unwrap();
    let session = MenuSession::new(table, cfg);

    let replies = session.respond("/menu Rosół, Sernik");
    assert_eq!(
        replies.last().unwrap(),
        &format!(
            "Bot: Menu ready! Saved as {} (PNG, max quality)",
            output.display()
        )
    );
    assert!(output.is_file());
}

#[test]
fn session_keeps_background_warning_out_of_replies() {
    let Some(font) = test_font_path() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), font, "menu.png");
    cfg.background = Some(dir.path().join("missing_background.png"));
    let output = cfg.output.clone();
    let table = load_menu_table(&cfg).unwrap();
    let session = MenuSession::new(table, cfg);

    let replies = session.respond("/menu Rosół");
    assert_eq!(
        replies,
        vec![
            "Bot: Got it! Generating menu with dishes: Rosół".to_string(),
            format!(
                "Bot: Menu ready! Saved as {} (PNG, max quality)",
                output.display()
            ),
        ]
    );
    assert!(output.is_file());
}
