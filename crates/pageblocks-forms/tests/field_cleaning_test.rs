//! Integration tests for cleaning editor input through field descriptors

use pageblocks_forms::{ErrorKind, FieldDescriptor, FieldValue, ImageRef, Widget};
use proptest::prelude::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(json!("  Welcome  "), FieldValue::Text("Welcome".to_string()))]
#[case(json!(null), FieldValue::Text(String::new()))]
fn test_char_field_trims_and_blanks(#[case] raw: serde_json::Value, #[case] expected: FieldValue) {
	// Arrange
	let field = FieldDescriptor::char("headline").with_max_length(150);

	// Act
	let cleaned = field.clean(Some(&raw)).unwrap();

	// Assert
	assert_eq!(cleaned, expected);
}

#[rstest]
fn test_rich_text_keeps_markup_verbatim() {
	let field = FieldDescriptor::rich_text("description");

	let cleaned = field.clean(Some(&json!("  <p>Hi</p>  "))).unwrap();

	assert_eq!(cleaned, FieldValue::Text("  <p>Hi</p>  ".to_string()));
}

#[rstest]
fn test_choice_default_fills_absent_value() {
	// Arrange
	let field = FieldDescriptor::choice("columns", [("2", "2 Columns"), ("3", "3 Columns")])
		.required()
		.with_default("3");

	// Act & Assert
	assert_eq!(field.clean(None).unwrap(), FieldValue::Text("3".to_string()));
	assert_eq!(
		field.clean(Some(&json!("4"))).unwrap_err().kind,
		ErrorKind::InvalidChoice { value: "4".to_string() }
	);
	assert_eq!(field.choice_label("2"), Some("2 Columns"));
	assert_eq!(field.widget(), Widget::Select);
}

#[rstest]
#[case(json!(999), false)]
#[case(json!(1000), true)]
#[case(json!(20000), true)]
#[case(json!(20001), false)]
fn test_integer_range(#[case] raw: serde_json::Value, #[case] accepted: bool) {
	let field = FieldDescriptor::integer("rotation_speed").with_range(1000, 20000);

	let result = field.clean(Some(&raw));

	assert_eq!(result.is_ok(), accepted);
}

#[rstest]
#[case(json!(42))]
#[case(json!("42"))]
fn test_image_ids_are_normalized(#[case] raw: serde_json::Value) {
	let field = FieldDescriptor::image("background_image");

	let cleaned = field.clean(Some(&raw)).unwrap();

	assert_eq!(cleaned.as_image(), Some(&ImageRef::from(42_i64)));
}

#[rstest]
fn test_url_field_rejects_relative_paths() {
	let field = FieldDescriptor::url("button_link").required();

	let result = field.clean(Some(&json!("/contact")));

	assert!(matches!(result.unwrap_err().kind, ErrorKind::InvalidUrl { .. }));
}

proptest! {
	#[test]
	fn prop_max_length_counts_characters(text in "[a-zé]{1,40}") {
		let field = FieldDescriptor::char("label").with_max_length(20);

		let result = field.clean(Some(&json!(&text)));

		prop_assert_eq!(result.is_ok(), text.chars().count() <= 20);
	}
}
