//! Conversion options.
//!
//! [`Options`] uses camelCase keys, so an exported settings record (partial
//! or complete) deserializes directly. Every field has a default.

use serde::{Deserialize, Serialize};

/// Default front-matter template.
pub const DEFAULT_FRONTMATTER: &str = "---\ncreated: {date:YYYY-MM-DDTHH:mm:ss} (UTC {date:Z})\ntags: [{keywords}]\nsource: {baseURI}\n---\n\n# {pageTitle}\n\n> ## Excerpt\n> {excerpt}\n\n---";

/// How headings are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// `# Heading`
    #[default]
    Atx,
    /// Underlined with `=` / `-` for levels 1 and 2.
    Setext,
}

/// How `<pre><code>` blocks are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeBlockStyle {
    /// Fenced with [`Options::fence`].
    #[default]
    Fenced,
    /// Indented by four spaces.
    Indented,
}

/// How anchors are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkStyle {
    /// `[text](href)`
    #[default]
    Inlined,
    /// `[text][n]` plus a reference definition at the end.
    Referenced,
    /// Anchor removed, inner text kept.
    StripLinks,
}

/// Reference form used with [`LinkStyle::Referenced`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkReferenceStyle {
    /// `[text][1]`
    #[default]
    Full,
    /// `[text][]`
    Collapsed,
    /// `[text]`
    Shortcut,
}

/// How images are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageStyle {
    /// Standard Markdown image pointing at the local file (or the source).
    #[default]
    Markdown,
    /// Source left as-is; eager fetch inlines it as a data URI.
    Base64,
    /// Source left as-is.
    OriginalSource,
    /// Images are dropped.
    NoImage,
    /// `![[path/to/file.png]]`
    Obsidian,
    /// `![[file.png]]`
    #[serde(rename = "obsidian-nofolder")]
    ObsidianNoFolder,
}

impl ImageStyle {
    /// Whether this style writes wiki-style embeds.
    pub fn is_obsidian(self) -> bool {
        matches!(self, Self::Obsidian | Self::ObsidianNoFolder)
    }
}

/// Inline or footnote-style images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRefStyle {
    /// `![alt](src)`
    #[default]
    Inlined,
    /// `![alt][figN]` plus `[figN]: src` at the end.
    Referenced,
}

/// When images are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadMode {
    /// Fetch every image during conversion to learn real extensions.
    #[default]
    #[serde(rename = "downloadsApi", alias = "eager")]
    Eager,
    /// Leave fetching to whoever persists the clip.
    #[serde(rename = "contentLink", alias = "deferred")]
    Deferred,
}

/// The full option set for one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub heading_style: HeadingStyle,
    pub hr: String,
    pub bullet_list_marker: String,
    pub code_block_style: CodeBlockStyle,
    pub fence: String,
    pub em_delimiter: String,
    pub strong_delimiter: String,
    pub link_style: LinkStyle,
    pub link_reference_style: LinkReferenceStyle,
    pub image_style: ImageStyle,
    pub image_ref_style: ImageRefStyle,
    /// Whether front/back-matter templates are applied.
    pub include_template: bool,
    pub frontmatter: String,
    pub backmatter: String,
    /// Template for the clip's file name.
    pub title: String,
    /// Template for the directory images are saved under.
    pub image_prefix: String,
    /// Template for the folder clips are saved under.
    pub md_clips_folder: Option<String>,
    /// Extra characters stripped from generated file names.
    pub disallowed_chars: String,
    pub download_images: bool,
    pub download_mode: DownloadMode,
    /// Escape Markdown-special characters in text.
    pub turndown_escape: bool,
    pub save_as: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "___".to_string(),
            bullet_list_marker: "-".to_string(),
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: "_".to_string(),
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            link_reference_style: LinkReferenceStyle::Full,
            image_style: ImageStyle::Markdown,
            image_ref_style: ImageRefStyle::Inlined,
            include_template: false,
            frontmatter: DEFAULT_FRONTMATTER.to_string(),
            backmatter: String::new(),
            title: "{pageTitle}".to_string(),
            image_prefix: "{pageTitle}/".to_string(),
            md_clips_folder: None,
            disallowed_chars: "[]#^".to_string(),
            download_images: false,
            download_mode: DownloadMode::Eager,
            turndown_escape: true,
            save_as: false,
        }
    }
}

impl Options {
    /// Flips a boolean setting by its settings-file name.
    ///
    /// Returns the new value, or `None` when `key` is not a boolean setting.
    ///
    /// ## Examples
    ///
    /// ```
    /// use markclip_lib::Options;
    ///
    /// let mut options = Options::default();
    /// assert_eq!(options.toggle("downloadImages"), Some(true));
    /// assert_eq!(options.toggle("fence"), None);
    /// ```
    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        let flag = match key {
            "includeTemplate" => &mut self.include_template,
            "downloadImages" => &mut self.download_images,
            "turndownEscape" => &mut self.turndown_escape,
            "saveAs" => &mut self.save_as,
            _ => return None,
        };
        *flag = !*flag;
        Some(*flag)
    }

    /// The fence character (first character of [`Options::fence`]).
    pub fn fence_char(&self) -> char {
        self.fence.chars().next().unwrap_or('`')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let options: Options =
            serde_json::from_str(r#"{"imageStyle": "obsidian-nofolder", "downloadImages": true}"#)
                .unwrap();
        assert_eq!(options.image_style, ImageStyle::ObsidianNoFolder);
        assert!(options.download_images);
        assert_eq!(options.fence, "```");
        assert_eq!(options.disallowed_chars, "[]#^");
    }

    #[test]
    fn original_setting_names_deserialize() {
        let yaml = "linkStyle: stripLinks\ndownloadMode: contentLink\nimageRefStyle: referenced\nmdClipsFolder: null\n";
        let options: Options = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.link_style, LinkStyle::StripLinks);
        assert_eq!(options.download_mode, DownloadMode::Deferred);
        assert_eq!(options.image_ref_style, ImageRefStyle::Referenced);
        assert_eq!(options.md_clips_folder, None);
    }

    #[test]
    fn download_mode_accepts_plain_aliases() {
        let options: Options = serde_yaml::from_str("downloadMode: deferred").unwrap();
        assert_eq!(options.download_mode, DownloadMode::Deferred);
    }

    #[test]
    fn serializes_with_original_names() {
        let json = serde_json::to_value(Options::default()).unwrap();
        assert_eq!(json["downloadMode"], "downloadsApi");
        assert_eq!(json["imageStyle"], "markdown");
        assert_eq!(json["bulletListMarker"], "-");
    }

    #[test]
    fn toggle_flips_booleans_only() {
        let mut options = Options::default();
        assert_eq!(options.toggle("includeTemplate"), Some(true));
        assert_eq!(options.toggle("includeTemplate"), Some(false));
        assert_eq!(options.toggle("title"), None);
    }

    #[test]
    fn fence_char_falls_back_to_backtick() {
        let options = Options {
            fence: String::new(),
            ..Default::default()
        };
        assert_eq!(options.fence_char(), '`');
        let options = Options {
            fence: "~~~".to_string(),
            ..Default::default()
        };
        assert_eq!(options.fence_char(), '~');
    }
}
