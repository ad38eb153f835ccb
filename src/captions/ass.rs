//! Typed ASS (Advanced SubStation Alpha) document model.
//!
//! The converter tool emits a complete ASS file; restyling works on a parsed
//! section model rather than line-oriented text surgery, so the `[V4+ Styles]`
//! block can be swapped wholesale while every other section passes through
//! untouched.

use super::types::CaptionStyle;

const STYLES_SECTION: &str = "V4+ Styles";
const EVENTS_SECTION: &str = "Events";

/// One named `[Section]` and its non-blank body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssSection {
    /// Section name without brackets, e.g. `Script Info`.
    pub name: String,
    /// Body lines in file order.
    pub lines: Vec<String>,
}

impl AssSection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: Vec::new(),
        }
    }
}

/// An ASS file as an ordered list of named sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssDocument {
    /// Lines appearing before the first section header (usually none).
    pub preamble: Vec<String>,
    /// Sections in file order.
    pub sections: Vec<AssSection>,
}

impl AssDocument {
    /// Parse ASS text into sections. Blank lines are structural separators
    /// and are not retained; a leading BOM is stripped.
    pub fn parse(content: &str) -> Self {
        let mut doc = Self::default();
        let mut current: Option<AssSection> = None;

        for raw in content.trim_start_matches('\u{feff}').lines() {
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                if let Some(section) = current.take() {
                    doc.sections.push(section);
                }
                current = Some(AssSection::new(&trimmed[1..trimmed.len() - 1]));
                continue;
            }
            match current.as_mut() {
                Some(section) => section.lines.push(line.to_string()),
                None => doc.preamble.push(line.to_string()),
            }
        }
        if let Some(section) = current.take() {
            doc.sections.push(section);
        }
        doc
    }

    /// Find a section by name, case-insensitively.
    pub fn section(&self, name: &str) -> Option<&AssSection> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Replace a section's body, inserting the section if absent.
    ///
    /// A new styles section is inserted before `[Events]` so players that
    /// resolve styles in document order still see it first; anything else
    /// is appended.
    pub fn replace_section(&mut self, name: &str, lines: Vec<String>) {
        if let Some(section) = self
            .sections
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(name))
        {
            section.lines = lines;
            return;
        }

        let section = AssSection {
            name: name.to_string(),
            lines,
        };
        let events_idx = self
            .sections
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(EVENTS_SECTION));
        match events_idx {
            Some(idx) if name.eq_ignore_ascii_case(STYLES_SECTION) => {
                self.sections.insert(idx, section)
            }
            _ => self.sections.push(section),
        }
    }

    /// Swap the `[V4+ Styles]` block for the given style, leaving every
    /// dialogue event and script header untouched.
    pub fn apply_style(&mut self, style: &CaptionStyle) {
        self.replace_section(
            STYLES_SECTION,
            vec![CaptionStyle::format_line().to_string(), style.style_line()],
        );
    }

    /// Serialize back to ASS text, one blank line between sections.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.preamble {
            out.push_str(line);
            out.push('\n');
        }
        for section in &self.sections {
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONVERTED: &str = "[Script Info]\n\
        ScriptType: v4.00+\n\
        PlayResX: 384\n\
        PlayResY: 288\n\
        \n\
        [V4+ Styles]\n\
        Format: Name, Fontname, Fontsize\n\
        Style: Default,Arial,16\n\
        \n\
        [Events]\n\
        Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
        Dialogue: 0,0:00:00.00,0:00:00.42,Default,,0,0,0,,hello\n\
        Dialogue: 0,0:00:00.42,0:00:00.90,Default,,0,0,0,,world\n";

    #[test]
    fn parse_splits_named_sections() {
        let doc = AssDocument::parse(CONVERTED);
        assert_eq!(doc.sections.len(), 3);
        assert_eq!(doc.section("Script Info").unwrap().lines.len(), 3);
        assert_eq!(doc.section("events").unwrap().lines.len(), 3);
    }

    #[test]
    fn apply_style_replaces_only_the_styles_block() {
        let mut doc = AssDocument::parse(CONVERTED);
        doc.apply_style(&CaptionStyle::default());

        let styles = doc.section(STYLES_SECTION).unwrap();
        assert_eq!(styles.lines.len(), 2);
        assert!(styles.lines[1].contains("Montserrat,16"));
        assert!(!styles.lines[1].contains("Arial"));

        let events = doc.section(EVENTS_SECTION).unwrap();
        assert_eq!(events.lines.len(), 3);
        assert!(events.lines[1].ends_with("hello"));
    }

    #[test]
    fn apply_style_inserts_missing_block_before_events() {
        let bare = "[Script Info]\nScriptType: v4.00+\n\n[Events]\nFormat: Layer, Text\n";
        let mut doc = AssDocument::parse(bare);
        doc.apply_style(&CaptionStyle::default());

        let names: Vec<&str> = doc.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Script Info", STYLES_SECTION, EVENTS_SECTION]);
    }

    #[test]
    fn render_round_trips_the_section_model() {
        let doc = AssDocument::parse(CONVERTED);
        let rendered = doc.render();
        assert_eq!(AssDocument::parse(&rendered), doc);
        assert!(rendered.starts_with("[Script Info]\n"));
    }

    #[test]
    fn bom_and_crlf_are_tolerated() {
        let windows = "\u{feff}[Script Info]\r\nTitle: x\r\n\r\n[Events]\r\n";
        let doc = AssDocument::parse(windows);
        assert_eq!(doc.section("Script Info").unwrap().lines, vec!["Title: x"]);
    }
}
