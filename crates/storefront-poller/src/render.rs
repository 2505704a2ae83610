//! Text rendering of the dashboard view.
//!
//! Lines are laid out plain and truncated to the display width first;
//! styling only wraps badges, so styled and plain output have the same
//! visible width.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, Stylize};
use crossterm::terminal::{Clear, ClearType};

use storefront_core::presenter::{BarSegment, DashboardView, RegionPanel, StatusBadge};

use crate::logging::Logger;
use crate::session::DashboardSink;

const SEGMENT_GLYPHS: [char; 6] = ['#', '=', '+', '*', '%', '~'];
const WEB_USER_GLYPH: char = '.';
const BAR_INDENT: &str = "    ";

#[must_use]
pub fn render_dashboard(view: &DashboardView, width: usize, styled: bool) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(truncate_line(
        &format!("Storefront console  {}", view.region_summary_label),
        width,
    ));
    for (key, value) in &view.product_info {
        lines.push(truncate_line(&format!("  {key}: {value}"), width));
    }
    lines.push(truncate_line(
        &format!(
            "Instances  active {}  heavy load {}  not responding {}",
            view.active_label, view.heavy_load_label, view.not_responding_label
        ),
        width,
    ));
    lines.push(truncate_line(
        &format!(
            "Users  {}  {}",
            view.simulated_users_label, view.real_users_label
        ),
        width,
    ));
    if !view.workload_labels.is_empty() {
        let totals = view
            .workload_labels
            .iter()
            .map(|w| format!("{} {}", w.name, w.text))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(truncate_line(&format!("Workloads  {totals}"), width));
    }

    for region in &view.regions {
        lines.push(String::new());
        render_region(&mut lines, region, width, styled);
    }
    lines
}

/// Snapshot text for non-interactive output.
#[must_use]
pub fn render_snapshot_text(view: &DashboardView, width: usize, styled: bool) -> String {
    let lines = render_dashboard(view, width, styled);
    if lines.is_empty() {
        return String::new();
    }
    let mut output = lines.join("\n");
    output.push('\n');
    output
}

fn render_region(lines: &mut Vec<String>, region: &RegionPanel, width: usize, styled: bool) {
    let badge = badge_text(region.badge);
    let rest = format!(
        " {}  {}  {} users",
        region.region_name, region.instance_count_label, region.user_count_label
    );
    lines.push(with_badge(region.badge, &badge, &rest, width, styled));

    let bar_width = width.saturating_sub(BAR_INDENT.len() + 2);
    lines.push(format!(
        "{BAR_INDENT}[{}]",
        render_bar(&region.segments, bar_width)
    ));

    let legend = region
        .segments
        .iter()
        .enumerate()
        .filter(|(_, seg)| seg.count > 0)
        .map(|(idx, seg)| format!("{} {}", segment_glyph(idx, region.segments.len()), seg.tooltip))
        .collect::<Vec<_>>()
        .join("  ");
    if !legend.is_empty() {
        lines.push(truncate_line(&format!("{BAR_INDENT}{legend}"), width));
    }

    for instance in &region.instances {
        let badge = badge_text(instance.badge);
        let rest = format!(" {}  {}", instance.uuid, instance.url);
        let line = with_badge(
            instance.badge,
            &badge,
            &rest,
            width.saturating_sub(2),
            styled,
        );
        lines.push(format!("  {line}"));
    }
}

/// Segments fill cells in proportion to their share of the busiest
/// region; a full-width bar is that region.
#[must_use]
pub fn render_bar(segments: &[BarSegment], bar_width: usize) -> String {
    let mut bar = String::with_capacity(bar_width);
    let mut used = 0usize;
    for (idx, segment) in segments.iter().enumerate() {
        let share = (segment.width_percent / 100.0 * bar_width as f64).round();
        let cells = if share.is_finite() && share > 0.0 {
            (share as usize).min(bar_width - used)
        } else {
            0
        };
        let glyph = segment_glyph(idx, segments.len());
        bar.extend(std::iter::repeat(glyph).take(cells));
        used += cells;
    }
    bar.extend(std::iter::repeat(' ').take(bar_width - used));
    bar
}

/// The last segment is always the web browser user segment.
fn segment_glyph(idx: usize, total: usize) -> char {
    if idx + 1 == total {
        WEB_USER_GLYPH
    } else {
        SEGMENT_GLYPHS[idx % SEGMENT_GLYPHS.len()]
    }
}

fn badge_text(badge: StatusBadge) -> String {
    format!("[{}]", badge.label())
}

fn with_badge(badge: StatusBadge, text: &str, rest: &str, width: usize, styled: bool) -> String {
    let badge_width = text.chars().count();
    if badge_width >= width {
        return truncate_line(text, width);
    }
    let rest = truncate_line(rest, width - badge_width);
    if styled {
        format!("{}{rest}", text.with(badge_color(badge)).bold())
    } else {
        format!("{text}{rest}")
    }
}

#[must_use]
pub fn badge_color(badge: StatusBadge) -> Color {
    match badge {
        StatusBadge::Refreshing => Color::Blue,
        StatusBadge::NotResponding => Color::Red,
        StatusBadge::HeavyLoad => Color::Yellow,
        StatusBadge::Success => Color::Green,
    }
}

#[must_use]
pub fn truncate_line(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let count = text.chars().count();
    if count <= width {
        return text.to_owned();
    }
    if width <= 3 {
        return text.chars().take(width).collect();
    }
    let mut out: String = text.chars().take(width - 3).collect();
    out.push_str("...");
    out
}

/// Last frame written to the terminal. Each repaint rewrites only the
/// rows that differ and blanks rows the new frame no longer covers.
#[derive(Debug, Default)]
pub struct FrameRepainter {
    previous: Vec<String>,
}

impl FrameRepainter {
    pub fn repaint<W: Write>(&mut self, out: &mut W, frame: &[String]) -> io::Result<()> {
        let rows = frame.len().max(self.previous.len());
        let mut dirty = false;
        for row in 0..rows {
            let next = frame.get(row);
            if next.is_some() && next == self.previous.get(row) {
                continue;
            }
            dirty = true;
            queue!(out, MoveTo(0, to_u16(row)), Clear(ClearType::CurrentLine))?;
            if let Some(line) = next {
                queue!(out, Print(line))?;
            }
        }
        if !dirty {
            return Ok(());
        }
        queue!(out, MoveTo(0, to_u16(frame.len())))?;
        out.flush()?;
        self.previous = frame.to_vec();
        Ok(())
    }
}

fn to_u16(row: usize) -> u16 {
    u16::try_from(row).unwrap_or(u16::MAX)
}

/// Watch-mode sink: repaints the terminal in place on every view.
pub struct TerminalSink<W: Write> {
    out: W,
    repainter: FrameRepainter,
    width: usize,
    styled: bool,
    footer: Option<String>,
    logger: Logger,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, width: usize, styled: bool, logger: Logger) -> Self {
        Self {
            out,
            repainter: FrameRepainter::default(),
            width,
            styled,
            footer: None,
            logger: logger.component("render"),
        }
    }

    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Clears the screen before the first frame.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DashboardSink for TerminalSink<W> {
    fn publish(&mut self, view: &DashboardView) {
        let mut lines = render_dashboard(view, self.width, self.styled);
        if let Some(footer) = &self.footer {
            lines.push(String::new());
            lines.push(truncate_line(footer, self.width));
        }
        if let Err(err) = self.repainter.repaint(&mut self.out, &lines) {
            let error = err.to_string();
            self.logger
                .warn_with("terminal repaint failed", &[("error", error.as_str())]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{render_bar, truncate_line, FrameRepainter};
    use storefront_core::presenter::bar_segment;

    #[test]
    fn truncate_line_adds_ellipsis() {
        assert_eq!(truncate_line("abcdefgh", 6), "abc...");
        assert_eq!(truncate_line("abc", 6), "abc");
        assert_eq!(truncate_line("abcdef", 2), "ab");
        assert_eq!(truncate_line("abc", 0), "");
    }

    #[test]
    fn bar_fills_in_proportion_to_the_busiest_region() {
        let segments = vec![
            bar_segment("checkout", 5, 20),
            bar_segment("Web browser user", 5, 20),
        ];
        assert_eq!(render_bar(&segments, 20), "#####.....          ");
    }

    #[test]
    fn bar_never_exceeds_its_width() {
        let segments = vec![
            bar_segment("a", 1, 2),
            bar_segment("b", 1, 2),
            bar_segment("Web browser user", 1, 2),
        ];
        assert_eq!(render_bar(&segments, 7).chars().count(), 7);
    }

    fn frame(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    fn repaint(repainter: &mut FrameRepainter, lines: &[&str]) -> String {
        let mut out = Vec::new();
        assert!(repainter.repaint(&mut out, &frame(lines)).is_ok());
        String::from_utf8(out).unwrap_or_default()
    }

    #[test]
    fn repaint_rewrites_only_changed_rows() {
        let mut repainter = FrameRepainter::default();
        let first = repaint(&mut repainter, &["[ok] us-east", "[ok] eu-west"]);
        assert!(first.contains("[ok] us-east"));
        assert!(first.contains("[ok] eu-west"));

        let second = repaint(&mut repainter, &["[ok] us-east", "[heavy load] eu-west"]);
        assert!(!second.contains("us-east"));
        assert!(second.contains("[heavy load] eu-west"));
    }

    #[test]
    fn repaint_blanks_rows_past_a_shorter_frame() {
        let mut repainter = FrameRepainter::default();
        repaint(&mut repainter, &["a", "b", "c"]);
        let shorter = repaint(&mut repainter, &["a"]);
        assert!(!shorter.is_empty());
        assert!(!shorter.contains('b'));
        assert!(!shorter.contains('c'));
    }

    #[test]
    fn repaint_skips_identical_frames() {
        let mut repainter = FrameRepainter::default();
        assert!(!repaint(&mut repainter, &["one", "two"]).is_empty());
        assert!(repaint(&mut repainter, &["one", "two"]).is_empty());
    }
}
