//! The home page block catalog
//!
//! Every block type the home page offers is declared here as data. Choice
//! lists that several blocks share (button styles, animation styles, overlay
//! opacity, theme modes) are declared once and reused, and the option groups
//! of the settings singletons are the same descriptors their blocks embed.

use crate::assets::Media;
use crate::blocks::{BlockDef, BlockLibrary, BlockSchema, StructBlock};
use crate::error::{CmsError, CmsResult};
use crate::stream::StreamCatalog;
use pageblocks_forms::FieldDescriptor;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

type Choices = &'static [(&'static str, &'static str)];

pub const LAYOUT_STYLES: Choices = &[
	("center", "Center Aligned"),
	("left", "Left Aligned"),
	("right", "Right Aligned"),
	("full", "Full Width"),
	("split", "Split Layout"),
	("overlap", "Content Overlap"),
];

pub const BACKGROUND_TYPES: Choices = &[
	("image", "Image"),
	("video", "Video"),
	("color", "Solid Color"),
	("gradient", "Gradient"),
];

pub const BUTTON_STYLES: Choices = &[
	("primary", "Primary"),
	("secondary", "Secondary"),
	("outline", "Outline"),
	("ghost", "Ghost"),
];

/// CTA sections do not offer the ghost style
pub const CTA_BUTTON_STYLES: Choices = &[
	("primary", "Primary"),
	("secondary", "Secondary"),
	("outline", "Outline"),
];

pub const OVERLAY_OPACITY: Choices = &[
	("0", "0%"),
	("25", "25%"),
	("50", "50%"),
	("75", "75%"),
	("90", "90%"),
];

pub const TEXT_ALIGNMENT: Choices = &[("left", "Left"), ("center", "Center"), ("right", "Right")];

pub const ANIMATION_STYLES: Choices = &[
	("none", "None"),
	("fade-in", "Fade In"),
	("fade-in-up", "Fade In Up"),
	("fade-in-down", "Fade In Down"),
	("fade-in-left", "Fade In Left"),
	("fade-in-right", "Fade In Right"),
	("zoom-in", "Zoom In"),
	("zoom-in-up", "Zoom In Up"),
	("zoom-in-down", "Zoom In Down"),
	("slide-in-up", "Slide In Up"),
	("slide-in-down", "Slide In Down"),
	("slide-in-left", "Slide In Left"),
	("slide-in-right", "Slide In Right"),
];

pub const SLIDE_TRANSITIONS: Choices = &[("fade", "Fade"), ("slide", "Slide"), ("zoom", "Zoom")];

pub const CONTENT_WIDTHS: Choices = &[
	("narrow", "Narrow (600px)"),
	("medium", "Medium (900px)"),
	("wide", "Wide (1200px)"),
	("full", "Full Width"),
];

pub const RATINGS: Choices = &[
	("5", "5 Stars"),
	("4", "4 Stars"),
	("3", "3 Stars"),
	("2", "2 Stars"),
	("1", "1 Star"),
];

pub const CARD_COLUMNS: Choices = &[("2", "Two Columns"), ("3", "Three Columns"), ("4", "Four Columns")];

pub const THEME_MODES: Choices = &[
	("system", "System Default"),
	("light", "Light Theme"),
	("dark", "Dark Theme"),
	("blue", "Ocean Breeze"),
	("green", "Forest Green"),
	("contrast", "High Contrast"),
	("sunset", "Sunset Glow"),
	("custom", "Custom Theme"),
];

pub const FONT_FAMILIES: Choices = &[
	("system", "System Default"),
	("sans-serif", "Sans Serif (Inter, Roboto, etc.)"),
	("serif", "Serif (Merriweather, Georgia, etc.)"),
	("monospace", "Monospace (Fira Code, Consolas, etc.)"),
];

pub const FONT_SIZE_SCALES: Choices = &[
	("sm", "Small (14px base)"),
	("md", "Medium (16px base)"),
	("lg", "Large (18px base)"),
	("xl", "Extra Large (20px base)"),
];

pub const SWITCHER_POSITIONS: Choices = &[
	("top-left", "Top Left"),
	("top-right", "Top Right"),
	("bottom-left", "Bottom Left"),
	("bottom-right", "Bottom Right"),
];

pub const SWITCHER_STYLES: Choices = &[
	("compact", "Compact (Icon Only)"),
	("full", "Full (Icon + Text)"),
	("expanded", "Expanded (Full Options)"),
];

pub const TRANSITION_DURATIONS: Choices = &[
	("fast", "Fast (150ms)"),
	("normal", "Normal (300ms)"),
	("slow", "Slow (500ms)"),
];

pub const FOCUS_OUTLINE_STYLES: Choices = &[
	("default", "Default Browser Outline"),
	("thick", "Thick Visible Outline"),
	("colorful", "Colorful Enhanced Outline"),
];

/// `(name, help text)` of the theme color fields, all hex values of at most 7 characters
const THEME_COLORS: &[(&str, &str)] = &[
	("primary_color", "Primary accent color in hex format (e.g., #3B82F6)."),
	("secondary_color", "Secondary color in hex format (e.g., #10B981)."),
	("background_color", "Main background color in hex format (e.g., #FFFFFF)."),
	("surface_color", "Surface elements color in hex format (e.g., cards, panels)."),
	("text_color", "Primary text color in hex format (e.g., #1E293B)."),
	("text_secondary_color", "Secondary text color in hex format (e.g., #64748B)."),
	("border_color", "Border and divider color in hex format (e.g., #E2E8F0)."),
];

/// Stable tags of the home page block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeBlockType {
	HeroBanner,
	HeroCarousel,
	HeroVideoBackground,
	ServiceCard,
	ServiceCards,
	Features,
	Testimonials,
	Stats,
	CtaSection,
	ThemeSelector,
}

impl HomeBlockType {
	/// All block types in the order the editor offers them
	pub const ALL: [HomeBlockType; 10] = [
		Self::HeroBanner,
		Self::HeroCarousel,
		Self::HeroVideoBackground,
		Self::ServiceCard,
		Self::ServiceCards,
		Self::Features,
		Self::Testimonials,
		Self::Stats,
		Self::CtaSection,
		Self::ThemeSelector,
	];

	/// Tag used in the serialized content stream
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::HeroBanner => "hero_banner",
			Self::HeroCarousel => "hero_carousel",
			Self::HeroVideoBackground => "hero_video_background",
			Self::ServiceCard => "service_card",
			Self::ServiceCards => "service_cards",
			Self::Features => "features",
			Self::Testimonials => "testimonials",
			Self::Stats => "stats",
			Self::CtaSection => "cta_section",
			Self::ThemeSelector => "theme_selector",
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::HeroBanner => "Hero Banner",
			Self::HeroCarousel => "Hero Carousel",
			Self::HeroVideoBackground => "Hero Video Background",
			Self::ServiceCard => "Service Card",
			Self::ServiceCards => "Service Cards",
			Self::Features => "Feature",
			Self::Testimonials => "Testimonial",
			Self::Stats => "Statistics",
			Self::CtaSection => "Call to Action",
			Self::ThemeSelector => "Theme Selector",
		}
	}

	/// Admin icon name
	pub fn icon(&self) -> &'static str {
		match self {
			Self::HeroBanner => "image",
			Self::HeroCarousel => "image",
			Self::HeroVideoBackground => "media",
			Self::ServiceCard => "pick",
			Self::ServiceCards => "list-ul",
			Self::Features => "pick",
			Self::Testimonials => "openquote",
			Self::Stats => "list-ol",
			Self::CtaSection => "link",
			Self::ThemeSelector => "cog",
		}
	}

	/// Block definition and assets of this type
	pub fn schema(&self) -> BlockSchema {
		let (def, media): (StructBlock, Media) = match self {
			Self::HeroBanner => (hero_banner(), Media::new().with_js("js/hero-banner.js")),
			Self::HeroCarousel => (
				hero_carousel(),
				Media::new()
					.with_css("css/hero-carousel.css")
					.with_js("js/hero-carousel.js"),
			),
			Self::HeroVideoBackground => (
				hero_video_background(),
				Media::new()
					.with_css("css/hero-video-background.css")
					.with_js("js/hero-video-background.js"),
			),
			Self::ServiceCard => (service_card(), Media::new().with_css("css/service-card.css")),
			Self::ServiceCards => (service_cards(), Media::new().with_css("css/service-cards.css")),
			Self::Features => (features(), Media::new()),
			Self::Testimonials => (testimonials(), Media::new()),
			Self::Stats => (stats(), Media::new()),
			Self::CtaSection => (cta_section(), Media::new()),
			Self::ThemeSelector => (theme_selector(), Media::new().with_js("js/theme-selector.js")),
		};

		BlockSchema::new(self.as_str(), def)
			.with_label(self.label())
			.with_icon(self.icon())
			.with_media(media)
	}
}

impl fmt::Display for HomeBlockType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for HomeBlockType {
	type Err = CmsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|block_type| block_type.as_str() == s)
			.ok_or_else(|| CmsError::UnknownBlockType(s.to_string()))
	}
}

/// Build the library of every home page block type
///
/// # Examples
///
/// ```
/// use pageblocks_cms::catalog::{HomeBlockType, home_library};
///
/// let library = home_library().unwrap();
/// assert_eq!(library.len(), HomeBlockType::ALL.len());
/// assert!(library.contains("service_cards"));
/// ```
pub fn home_library() -> CmsResult<BlockLibrary> {
	let mut library = BlockLibrary::new();
	for block_type in HomeBlockType::ALL {
		library.register(block_type.schema())?;
	}
	library.check()?;
	Ok(library)
}

/// The home page stream: every catalog type is allowed, in catalog order
pub fn home_stream_catalog() -> CmsResult<StreamCatalog> {
	let library = Arc::new(home_library()?);
	StreamCatalog::new(library, HomeBlockType::ALL.iter().map(HomeBlockType::as_str))
}

fn choice(name: &str, choices: Choices, default: &str, help_text: &str) -> FieldDescriptor {
	FieldDescriptor::choice(name, choices.iter().copied())
		.required()
		.with_default(default)
		.with_help_text(help_text)
}

fn flag(name: &str, default: bool, help_text: &str) -> FieldDescriptor {
	FieldDescriptor::boolean(name)
		.with_default(default)
		.with_help_text(help_text)
}

fn hex_color(name: &str, help_text: &str) -> FieldDescriptor {
	FieldDescriptor::char(name)
		.with_max_length(7)
		.with_help_text(help_text)
}

fn animation_style(default: &str) -> FieldDescriptor {
	choice(
		"animation_style",
		ANIMATION_STYLES,
		default,
		"Choose the animation for the hero content.",
	)
}

fn overlay_opacity() -> FieldDescriptor {
	choice(
		"overlay_opacity",
		OVERLAY_OPACITY,
		"50",
		"Overlay opacity for better readability.",
	)
}

/// Options shared by the theme settings singleton and the theme selector block
pub fn theme_options() -> Vec<FieldDescriptor> {
	let mut fields = vec![choice(
		"theme_mode",
		THEME_MODES,
		"system",
		"Select the theme mode for the website.",
	)];
	fields.extend(
		THEME_COLORS
			.iter()
			.map(|(name, help_text)| hex_color(name, help_text)),
	);
	fields.extend([
		choice(
			"font_family",
			FONT_FAMILIES,
			"system",
			"Select the font family for the website.",
		),
		choice(
			"font_size_scale",
			FONT_SIZE_SCALES,
			"md",
			"Adjust the overall font size scale.",
		),
		choice(
			"switcher_position",
			SWITCHER_POSITIONS,
			"bottom-right",
			"Position of the theme switcher widget.",
		),
		choice(
			"switcher_style",
			SWITCHER_STYLES,
			"full",
			"Visual style of the theme switcher widget.",
		),
		flag(
			"enable_transitions",
			true,
			"Enable smooth transitions between theme changes.",
		),
		choice(
			"transition_duration",
			TRANSITION_DURATIONS,
			"normal",
			"Duration of theme transition animations.",
		),
		flag(
			"enable_persistence",
			true,
			"Save user theme preference across sessions.",
		),
		flag(
			"enable_auto_detect",
			true,
			"Automatically detect system theme changes.",
		),
		flag(
			"auto_contrast_adjustment",
			true,
			"Automatically adjust text colors for better contrast.",
		),
		flag(
			"enable_high_contrast_mode",
			false,
			"Enable high contrast mode for improved accessibility.",
		),
		choice(
			"focus_outline_style",
			FOCUS_OUTLINE_STYLES,
			"default",
			"Style of focus outlines for keyboard navigation.",
		),
	]);
	fields
}

/// Options shared by the carousel settings singleton and the carousel block
pub fn carousel_options() -> Vec<FieldDescriptor> {
	vec![
		flag("auto_rotate", true, "Automatically rotate through slides."),
		FieldDescriptor::integer("rotation_speed")
			.with_range(1000, 20000)
			.with_default(5000_i64)
			.with_help_text("Time between slides in milliseconds."),
		flag("pause_on_hover", true, "Pause rotation while the pointer is over the carousel."),
		choice(
			"animation_style",
			SLIDE_TRANSITIONS,
			"fade",
			"Transition used between slides.",
		),
		flag("show_indicators", true, "Show slide indicator dots."),
		flag("show_controls", true, "Show previous and next controls."),
	]
}

/// Options shared by the video background settings singleton and its block
pub fn video_options() -> Vec<FieldDescriptor> {
	vec![
		flag("enable_autoplay", true, "Start the video automatically."),
		flag("enable_loop", true, "Loop the video."),
		flag("enable_mute", true, "Mute the video. Most browsers only autoplay muted video."),
		flag(
			"disable_on_mobile",
			true,
			"Show the fallback image instead of the video on mobile devices.",
		),
		overlay_opacity(),
		animation_style("fade-in"),
	]
}

fn hero_banner() -> StructBlock {
	StructBlock::new().fields([
		choice(
			"layout_style",
			LAYOUT_STYLES,
			"center",
			"Select the layout style for the hero banner.",
		),
		choice(
			"background_type",
			BACKGROUND_TYPES,
			"image",
			"Select the background type.",
		),
		FieldDescriptor::image("background_image")
			.with_help_text("Background image for the hero banner."),
		hex_color(
			"background_color",
			"Background color in hex format (e.g., #FF0000).",
		),
		FieldDescriptor::url("background_video")
			.with_help_text("Background video URL (YouTube or Vimeo)."),
		FieldDescriptor::char("headline")
			.with_max_length(150)
			.with_help_text("Main headline for the hero banner."),
		FieldDescriptor::text("subtitle")
			.with_max_length(300)
			.with_help_text("Subtitle for the hero banner."),
		FieldDescriptor::rich_text("description")
			.with_help_text("Detailed description for the hero banner."),
		FieldDescriptor::char("cta_primary")
			.with_max_length(150)
			.with_help_text("Primary CTA text."),
		FieldDescriptor::url("cta_primary_link").with_help_text("Primary CTA link."),
		choice("cta_primary_style", BUTTON_STYLES, "primary", "Primary CTA style."),
		FieldDescriptor::char("cta_secondary")
			.with_max_length(150)
			.with_help_text("Secondary CTA text."),
		FieldDescriptor::url("cta_secondary_link").with_help_text("Secondary CTA link."),
		choice(
			"cta_secondary_style",
			BUTTON_STYLES,
			"outline",
			"Secondary CTA style.",
		),
		overlay_opacity(),
		choice(
			"text_alignment",
			TEXT_ALIGNMENT,
			"center",
			"Text alignment within the hero banner.",
		),
		animation_style("none"),
		flag(
			"enable_parallax",
			false,
			"Enable parallax effect for background.",
		),
		flag(
			"enable_particles",
			false,
			"Enable particle background effect.",
		),
		choice(
			"content_width",
			CONTENT_WIDTHS,
			"medium",
			"Content container width.",
		),
		FieldDescriptor::integer("padding_top")
			.with_range(0, 200)
			.with_help_text("Top padding in pixels."),
		FieldDescriptor::integer("padding_bottom")
			.with_range(0, 200)
			.with_help_text("Bottom padding in pixels."),
	])
}

fn carousel_slide() -> StructBlock {
	StructBlock::new().fields([
		FieldDescriptor::char("headline")
			.with_max_length(150)
			.with_help_text("Slide headline."),
		FieldDescriptor::text("subtitle")
			.with_max_length(300)
			.with_help_text("Slide subtitle."),
		FieldDescriptor::image("background_image").with_help_text("Slide background image."),
		hex_color("background_color", "Slide background color in hex format."),
		FieldDescriptor::char("cta_text")
			.with_max_length(50)
			.with_help_text("Slide button text."),
		FieldDescriptor::url("cta_link").with_help_text("Slide button link."),
	])
}

fn hero_carousel() -> StructBlock {
	StructBlock::new()
		.block("slides", BlockDef::list(carousel_slide(), 1, Some(5)))
		.fields(carousel_options())
}

fn hero_video_background() -> StructBlock {
	StructBlock::new()
		.fields([
			FieldDescriptor::url("video_url")
				.required()
				.with_help_text("Video URL (MP4, YouTube or Vimeo)."),
			FieldDescriptor::image("fallback_image")
				.with_help_text("Image shown while the video loads or when video is disabled."),
			FieldDescriptor::char("headline")
				.with_max_length(150)
				.with_help_text("Main headline."),
			FieldDescriptor::text("subtitle")
				.with_max_length(300)
				.with_help_text("Subtitle."),
		])
		.fields(video_options())
}

fn service_card() -> StructBlock {
	StructBlock::new().fields([
		FieldDescriptor::image("icon").with_help_text("Icon for the service."),
		FieldDescriptor::char("title")
			.required()
			.with_max_length(100)
			.with_help_text("Service title."),
		FieldDescriptor::text("description")
			.with_max_length(300)
			.with_help_text("Service description."),
		FieldDescriptor::url("link").with_help_text("Optional link for the service."),
		FieldDescriptor::char("link_text")
			.with_max_length(50)
			.with_default("Learn more")
			.with_help_text("Link text."),
	])
}

fn service_cards() -> StructBlock {
	StructBlock::new()
		.fields([
			FieldDescriptor::char("title")
				.with_max_length(150)
				.with_help_text("Section title."),
			FieldDescriptor::text("subtitle")
				.with_max_length(300)
				.with_help_text("Section subtitle."),
			choice("columns", CARD_COLUMNS, "3", "Number of columns on wide screens."),
		])
		.block(
			"cards",
			BlockDef::list(
				BlockDef::reference(HomeBlockType::ServiceCard.as_str()),
				1,
				Some(12),
			),
		)
}

fn features() -> StructBlock {
	StructBlock::new().fields([
		FieldDescriptor::image("icon").with_help_text("Icon for the feature."),
		FieldDescriptor::char("title")
			.required()
			.with_max_length(100)
			.with_help_text("Feature title."),
		FieldDescriptor::text("description")
			.required()
			.with_max_length(300)
			.with_help_text("Feature description."),
		FieldDescriptor::url("link").with_help_text("Optional link for the feature."),
	])
}

fn testimonials() -> StructBlock {
	StructBlock::new().fields([
		FieldDescriptor::text("quote")
			.required()
			.with_max_length(500)
			.with_help_text("Customer testimonial."),
		FieldDescriptor::char("author")
			.required()
			.with_max_length(100)
			.with_help_text("Customer name."),
		FieldDescriptor::char("role")
			.with_max_length(100)
			.with_help_text("Customer role or position."),
		FieldDescriptor::char("company")
			.with_max_length(100)
			.with_help_text("Customer company."),
		FieldDescriptor::image("avatar").with_help_text("Customer avatar or photo."),
		choice("rating", RATINGS, "5", "Customer rating."),
	])
}

fn stats() -> StructBlock {
	let stat = StructBlock::new().fields([
		FieldDescriptor::char("value")
			.required()
			.with_max_length(20)
			.with_help_text("Statistical value (e.g., \"1000+\", \"99%\")."),
		FieldDescriptor::char("label")
			.required()
			.with_max_length(50)
			.with_help_text("Stat label (e.g., \"Customers\", \"Satisfaction\")."),
		FieldDescriptor::text("description")
			.with_max_length(150)
			.with_help_text("Optional description."),
	]);
	StructBlock::new().block("stat", BlockDef::list(stat, 1, Some(6)))
}

fn cta_section() -> StructBlock {
	StructBlock::new().fields([
		FieldDescriptor::char("title")
			.required()
			.with_max_length(150)
			.with_help_text("Section title."),
		FieldDescriptor::text("description")
			.with_max_length(300)
			.with_help_text("Section description."),
		FieldDescriptor::char("button_text")
			.required()
			.with_max_length(50)
			.with_help_text("CTA button text."),
		FieldDescriptor::url("button_link")
			.required()
			.with_help_text("CTA button link."),
		choice("button_style", CTA_BUTTON_STYLES, "primary", "Button style."),
		hex_color("background_color", "Background color in hex format."),
	])
}

fn theme_selector() -> StructBlock {
	// Block-only switches sit next to the options they modify
	let mut fields = theme_options();
	fields.insert(
		1,
		flag(
			"enable_customization",
			false,
			"Enable advanced theme customization options. Only applies to \"Custom Theme\" mode.",
		),
	);
	let switcher_at = fields
		.iter()
		.position(|field| field.name == "switcher_position")
		.unwrap_or(fields.len());
	fields.insert(
		switcher_at,
		flag(
			"show_theme_switcher",
			true,
			"Show the theme switcher widget on the page for user theme selection.",
		),
	);
	let server_at = fields
		.iter()
		.position(|field| field.name == "enable_auto_detect")
		.unwrap_or(fields.len());
	fields.insert(
		server_at,
		flag(
			"enable_server_persistence",
			false,
			"Save user theme preference on the server (requires user authentication).",
		),
	);
	StructBlock::new().fields(fields)
}
