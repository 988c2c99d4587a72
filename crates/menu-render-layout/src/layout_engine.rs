use std::sync::Arc;

use crate::layout_config::{LayoutConfig, TextStyle, VerticalAlign};
use crate::layout_ir::{
    BlockRole, CategoryGroup, CoordinateSystem, DrawCommand, LayoutMetrics, MenuEntry, MenuPage,
    TextCommand,
};

/// Slack allowed when comparing accumulated float positions.
const FLOW_EPSILON: f32 = 1e-3;

/// Text measurement hook for glyph-accurate line fitting.
///
/// Implementations must be pure: the same input always yields the same width,
/// otherwise the height pass and the draw pass can disagree.
pub trait TextMeasurer: Send + Sync {
    /// Measure rendered text width for a font reference at `size`.
    fn measure_text(&self, text: &str, font: &str, size: f32) -> f32;
}

/// Fixed-advance width estimate used when no font-backed measurer is installed.
///
/// Keeps layout usable in tests and for fonts a caller never registered;
/// real renders measure with the loaded faces.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn measure_text(&self, text: &str, _font: &str, size: f32) -> f32 {
        fallback_width(text, size)
    }
}

/// Top-down vertical progress through the content area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutCursor {
    y_top: f32,
}

impl LayoutCursor {
    pub fn new(y_top: f32) -> Self {
        Self { y_top }
    }

    pub fn y_top(self) -> f32 {
        self.y_top
    }

    pub fn advance(&mut self, dy: f32) {
        self.y_top += dy;
    }
}

/// Group entries by category, keeping first-seen category order and
/// requested entry order inside each group.
pub fn group_by_category<I>(entries: I) -> Vec<CategoryGroup>
where
    I: IntoIterator<Item = MenuEntry>,
{
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|g| g.category == entry.category) {
            Some(group) => group.entries.push(entry),
            None => groups.push(CategoryGroup {
                category: entry.category.clone(),
                entries: vec![entry],
            }),
        }
    }
    groups
}

/// Deterministic layout engine that emits a menu page.
#[derive(Clone)]
pub struct LayoutEngine {
    cfg: LayoutConfig,
    coordinate_system: CoordinateSystem,
    text_measurer: Option<Arc<dyn TextMeasurer>>,
}

impl core::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("cfg", &self.cfg)
            .field("coordinate_system", &self.coordinate_system)
            .field("has_text_measurer", &self.text_measurer.is_some())
            .finish()
    }
}

impl LayoutEngine {
    /// Create a layout engine emitting top-down coordinates.
    pub fn new(cfg: LayoutConfig) -> Self {
        Self {
            cfg,
            coordinate_system: CoordinateSystem::TopDown,
            text_measurer: None,
        }
    }

    /// Select the coordinate system draw commands are emitted in.
    pub fn with_coordinate_system(mut self, coordinate_system: CoordinateSystem) -> Self {
        self.coordinate_system = coordinate_system;
        self
    }

    /// Install a shared text measurer for glyph-accurate width fitting.
    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.text_measurer = Some(measurer);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// Measured width of `text` in `style`.
    pub fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        match &self.text_measurer {
            Some(measurer) => measurer.measure_text(text, &style.font, style.size),
            None => fallback_width(text, style.size),
        }
    }

    /// Greedy word wrap.
    ///
    /// Every line fits `max_width` unless it is a single word that is wider on
    /// its own; such words are kept whole on their own line.
    pub fn wrap_text(&self, text: &str, style: &TextStyle, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line = String::new();
        for word in text.split_whitespace() {
            let mut candidate = String::with_capacity(line.len() + word.len() + 1);
            candidate.push_str(&line);
            if !line.is_empty() {
                candidate.push(' ');
            }
            candidate.push_str(word);

            if self.measure(&candidate, style) > max_width && !line.is_empty() {
                lines.push(core::mem::take(&mut line));
                line.push_str(word);
            } else {
                line = candidate;
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }

    /// Dry-run pass: vertical extent of the laid-out groups.
    pub fn measure_height(&self, groups: &[CategoryGroup]) -> f32 {
        self.flow(groups, LayoutCursor::new(0.0), |_, _, _| {}).y_top()
    }

    /// Starting cursor for a block of `total_height`.
    pub fn resolve_start_y(&self, total_height: f32) -> f32 {
        let content = &self.cfg.content;
        match (self.cfg.vertical_align, self.cfg.middle_y) {
            (VerticalAlign::Top, _) => self.cfg.spacing.first_baseline_y_top,
            (VerticalAlign::Middle, Some(anchor)) => {
                content.y_top.max(anchor - total_height / 2.0)
            }
            (VerticalAlign::Middle, None) => {
                content.y_top + ((content.height - total_height) / 2.0).max(0.0)
            }
        }
    }

    /// Left x that centers a run of `text_width` in the content width.
    pub fn centered_x(&self, text_width: f32) -> f32 {
        self.cfg.content.x + (self.cfg.content.width - text_width) / 2.0
    }

    /// Layout entries in requested order.
    pub fn layout_entries<I>(&self, entries: I) -> MenuPage
    where
        I: IntoIterator<Item = MenuEntry>,
    {
        self.layout_groups(&group_by_category(entries))
    }

    /// Layout pre-grouped entries into a page.
    pub fn layout_groups(&self, groups: &[CategoryGroup]) -> MenuPage {
        let mut page = MenuPage::new(
            self.cfg.page.width,
            self.cfg.page.height,
            self.coordinate_system,
        );
        let metrics = self.layout_with(groups, |cmd| page.push_command(cmd));
        page.metrics = metrics;
        page
    }

    /// Layout groups, streaming each draw command to `on_command`.
    pub fn layout_with<F>(&self, groups: &[CategoryGroup], mut on_command: F) -> LayoutMetrics
    where
        F: FnMut(DrawCommand),
    {
        let total_height = self.measure_height(groups);
        let start_y = self.resolve_start_y(total_height);
        let page_height = self.cfg.page.height;
        let mut line_count = 0usize;

        let end = self.flow(groups, LayoutCursor::new(start_y), |role, text, y_top| {
            line_count += 1;
            if text.trim().is_empty() {
                return;
            }
            let style = self.style_for(role);
            let width = self.measure(text, style);
            on_command(DrawCommand::Text(TextCommand {
                x: self.centered_x(width),
                y: self.coordinate_system.map_y(y_top, page_height),
                text: text.to_string(),
                font: style.font.clone(),
                size: style.size,
                color: style.color,
                role,
            }));
        });

        let overflow = start_y + total_height > self.cfg.content.bottom() + FLOW_EPSILON;
        if overflow {
            log::warn!(
                "menu block overflows content area: start={:.1} height={:.1} bottom={:.1}",
                start_y,
                total_height,
                self.cfg.content.bottom()
            );
        }
        log::debug!(
            "laid out {} groups, {} lines, height={:.1}, start_y={:.1}",
            groups.len(),
            line_count,
            total_height,
            start_y
        );

        LayoutMetrics {
            total_height,
            start_y,
            end_y: end.y_top(),
            line_count,
            overflow,
        }
    }

    fn style_for(&self, role: BlockRole) -> &TextStyle {
        let typography = &self.cfg.typography;
        match role {
            BlockRole::CategoryTitle => &typography.title,
            BlockRole::DishName => &typography.name,
            BlockRole::Description => &typography.desc,
        }
    }

    /// Walk every block in flow order; both passes go through here.
    fn flow<F>(
        &self,
        groups: &[CategoryGroup],
        mut cursor: LayoutCursor,
        mut visit: F,
    ) -> LayoutCursor
    where
        F: FnMut(BlockRole, &str, f32),
    {
        let spacing = &self.cfg.spacing;
        let wrap_width = self.cfg.desc_wrap_width();
        for group in groups {
            visit(BlockRole::CategoryTitle, &group.category, cursor.y_top());
            cursor.advance(spacing.title_break_after + spacing.title_line);

            for entry in &group.entries {
                visit(BlockRole::DishName, &entry.name, cursor.y_top());
                cursor.advance(spacing.name_line);

                let desc_style = &self.cfg.typography.desc;
                for line in self.wrap_text(&entry.description, desc_style, wrap_width) {
                    visit(BlockRole::Description, &line, cursor.y_top());
                    cursor.advance(spacing.desc_line);
                }
                cursor.advance(spacing.dish_gap);
            }
            cursor.advance(spacing.category_gap);
        }
        cursor
    }
}

/// Advance of every character when no font metrics are available, in ems.
const FALLBACK_ADVANCE_EM: f32 = 0.5;

fn fallback_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * FALLBACK_ADVANCE_EM
}
