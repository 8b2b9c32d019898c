// src/services/post_normalizer.rs
//
// Turns the editor payload into insert/update rows: multi-select lists are
// flattened to their values and the optional SEO / medical metadata gets its
// defaults.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::dtos::post_dtos::{PostFormIn, SelectOption};
use crate::models::post::{NewPost, PostPatch, PostStatus};

const MIN_CORE_LEN: usize = 3;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").expect("url regex"));
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug regex"));

/// Lowercase, keep ASCII alphanumerics, collapse everything else into single dashes.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Option values in order, blanks dropped, duplicates removed.
pub fn flatten_options(options: Option<Vec<SelectOption>>) -> Vec<String> {
    let mut seen = HashSet::new();
    options
        .unwrap_or_default()
        .into_iter()
        .map(|o| o.value.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_category_id(raw: &str) -> Option<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Uuid::parse_str(raw).ok()
}

fn non_negative(value: Option<i64>) -> Option<i32> {
    value.and_then(|v| i32::try_from(v).ok()).filter(|v| *v >= 0)
}

/// Fills a missing slug from the title. Runs before validation.
pub fn prepare(mut form: PostFormIn) -> PostFormIn {
    if form.slug.trim().is_empty() {
        form.slug = generate_slug(&form.title);
    } else {
        form.slug = form.slug.trim().to_string();
    }
    form
}

/// Collects every problem with the form instead of stopping at the first.
pub fn validate(form: &PostFormIn) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    for (field, value) in [
        ("title", &form.title),
        ("slug", &form.slug),
        ("content", &form.content),
    ] {
        if value.trim().chars().count() < MIN_CORE_LEN {
            problems.push(format!("{} must be at least {} characters", field, MIN_CORE_LEN));
        }
    }

    if form.slug.trim().chars().count() >= MIN_CORE_LEN && !SLUG_RE.is_match(form.slug.trim()) {
        problems.push("slug may only contain lowercase letters, digits and dashes".to_string());
    }

    if form.status.parse::<PostStatus>().is_err() {
        problems.push(format!("status '{}' is not one of draft, published", form.status));
    }

    if !form.category_id.trim().is_empty() && parse_category_id(&form.category_id).is_none() {
        problems.push("categoryId is not a valid id".to_string());
    }

    for (field, value) in [
        ("canonicalUrl", &form.canonical_url),
        ("authorProfileUrl", &form.author_profile_url),
        ("editorialPolicyUrl", &form.editorial_policy_url),
        ("medicalBoardUrl", &form.medical_board_url),
        ("publisherUrl", &form.publisher_url),
    ] {
        if let Some(url) = value.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            if !URL_RE.is_match(url) {
                problems.push(format!("{} must be a valid URL", field));
            }
        }
    }

    for (field, value) in [
        ("authorExperienceYrs", form.author_experience_yrs),
        ("readingTime", form.reading_time),
    ] {
        if let Some(v) = value {
            if v < 0 || v > i64::from(i32::MAX) {
                problems.push(format!("{} must be a non-negative number", field));
            }
        }
    }

    if problems.is_empty() { Ok(()) } else { Err(problems) }
}

pub fn normalize_for_create(
    form: PostFormIn,
    user_id: Uuid,
    site_url: &str,
    now: DateTime<Utc>,
) -> NewPost {
    let title = form.title.trim().to_string();
    let slug = form.slug.trim().to_string();
    let image_url = form.image_url.trim().to_string();

    let seo_title = blank_to_none(form.seo_title).unwrap_or_else(|| title.clone());
    let canonical_url = blank_to_none(form.canonical_url)
        .unwrap_or_else(|| format!("{}/blog/{}", site_url.trim_end_matches('/'), slug));
    let og_image = blank_to_none(form.og_image).or_else(|| Some(image_url.clone()).filter(|u| !u.is_empty()));

    NewPost {
        user_id,
        status: form.status.parse().unwrap_or_default(),
        category_id: parse_category_id(&form.category_id),
        image_alt: blank_to_none(form.image_alt),
        tags: flatten_options(form.tags),
        content: form.content,

        seo_title: Some(seo_title),
        seo_description: Some(blank_to_none(form.seo_description).unwrap_or_default()),
        canonical_url: Some(canonical_url),
        primary_keyword: blank_to_none(form.primary_keyword),
        og_image,
        no_index: form.no_index.unwrap_or(false),

        author: blank_to_none(form.author),
        author_credentials: blank_to_none(form.author_credentials),
        author_profile_url: blank_to_none(form.author_profile_url),
        author_experience_yrs: non_negative(form.author_experience_yrs),
        date_published: Some(form.date_published.unwrap_or(now)),
        date_modified: form.date_modified,
        reading_time: non_negative(form.reading_time),

        reviewed_by: blank_to_none(form.reviewed_by),
        reviewer_credentials: blank_to_none(form.reviewer_credentials),
        medical_review_date: form.medical_review_date,

        main_entity: blank_to_none(form.main_entity),
        medical_specialty: blank_to_none(form.medical_specialty),
        medical_conditions: flatten_options(form.medical_conditions),
        symptoms: flatten_options(form.symptoms),
        treatments: flatten_options(form.treatments),
        medications: flatten_options(form.medications),

        last_medical_update: form.last_medical_update,
        content_version: blank_to_none(form.content_version),

        intent: blank_to_none(form.intent),
        editorial_policy_url: blank_to_none(form.editorial_policy_url),
        medical_board_url: blank_to_none(form.medical_board_url),
        has_disclaimer: form.has_disclaimer.unwrap_or(true),
        risk_level: blank_to_none(form.risk_level),

        publisher_name: blank_to_none(form.publisher_name),
        publisher_url: blank_to_none(form.publisher_url),
        publisher_logo_url: blank_to_none(form.publisher_logo_url),

        citations: flatten_options(form.citations),
        target_audience: blank_to_none(form.target_audience),

        title,
        slug,
        image_url,
    }
}

pub fn normalize_for_update(form: PostFormIn, user_id: Uuid) -> PostPatch {
    PostPatch {
        user_id,
        title: form.title.trim().to_string(),
        slug: form.slug.trim().to_string(),
        content: form.content,
        image_url: form.image_url.trim().to_string(),
        tags: flatten_options(form.tags),
        status: form.status.parse().unwrap_or_default(),
        category_id: parse_category_id(&form.category_id),
        has_disclaimer: form.has_disclaimer.unwrap_or(true),

        medical_conditions: flatten_options(form.medical_conditions),
        symptoms: flatten_options(form.symptoms),
        treatments: flatten_options(form.treatments),
        medications: flatten_options(form.medications),
        citations: flatten_options(form.citations),

        image_alt: blank_to_none(form.image_alt),
        seo_title: blank_to_none(form.seo_title),
        seo_description: blank_to_none(form.seo_description),
        canonical_url: blank_to_none(form.canonical_url),
        primary_keyword: blank_to_none(form.primary_keyword),
        og_image: blank_to_none(form.og_image),
        no_index: form.no_index,

        author: blank_to_none(form.author),
        author_credentials: blank_to_none(form.author_credentials),
        author_profile_url: blank_to_none(form.author_profile_url),
        author_experience_yrs: non_negative(form.author_experience_yrs),
        date_published: form.date_published,
        date_modified: form.date_modified,
        reading_time: non_negative(form.reading_time),

        reviewed_by: blank_to_none(form.reviewed_by),
        reviewer_credentials: blank_to_none(form.reviewer_credentials),
        medical_review_date: form.medical_review_date,

        main_entity: blank_to_none(form.main_entity),
        medical_specialty: blank_to_none(form.medical_specialty),

        last_medical_update: form.last_medical_update,
        content_version: blank_to_none(form.content_version),

        intent: blank_to_none(form.intent),
        editorial_policy_url: blank_to_none(form.editorial_policy_url),
        medical_board_url: blank_to_none(form.medical_board_url),
        risk_level: blank_to_none(form.risk_level),

        publisher_name: blank_to_none(form.publisher_name),
        publisher_url: blank_to_none(form.publisher_url),
        publisher_logo_url: blank_to_none(form.publisher_logo_url),

        target_audience: blank_to_none(form.target_audience),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn sample_form() -> PostFormIn {
        PostFormIn {
            title: "Managing Type 2 Diabetes".into(),
            slug: "managing-type-2-diabetes".into(),
            content: "<p>Diet, exercise and medication.</p>".into(),
            image_url: "https://cdn.example.com/diabetes.jpg".into(),
            status: "published".into(),
            tags: Some(vec![SelectOption::new("diabetes"), SelectOption::new("nutrition")]),
            ..Default::default()
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn slug_from_title() {
        assert_eq!(generate_slug("Heart Health: 10 Tips!"), "heart-health-10-tips");
        assert_eq!(generate_slug("  --Sleep & Stress--  "), "sleep-stress");
        assert_eq!(generate_slug("???"), "");
    }

    #[test]
    fn options_flatten_to_unique_values() {
        let opts = Some(vec![
            SelectOption { label: "Asthma".into(), value: "asthma".into() },
            SelectOption { label: "".into(), value: "  ".into() },
            SelectOption { label: "asthma again".into(), value: "asthma".into() },
            SelectOption { label: "COPD".into(), value: "copd".into() },
        ]);
        assert_eq!(flatten_options(opts), vec!["asthma", "copd"]);
        assert!(flatten_options(None).is_empty());
    }

    #[test]
    fn create_applies_seo_defaults() {
        let user = Uuid::new_v4();
        let post = normalize_for_create(sample_form(), user, "https://blog.example.com/", fixed_now());

        assert_eq!(post.user_id, user);
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.seo_title.as_deref(), Some("Managing Type 2 Diabetes"));
        assert_eq!(post.seo_description.as_deref(), Some(""));
        assert_eq!(
            post.canonical_url.as_deref(),
            Some("https://blog.example.com/blog/managing-type-2-diabetes")
        );
        assert_eq!(post.og_image.as_deref(), Some("https://cdn.example.com/diabetes.jpg"));
        assert_eq!(post.date_published, Some(fixed_now()));
        assert!(post.has_disclaimer);
        assert!(!post.no_index);
        assert_eq!(post.category_id, None);
        assert_eq!(post.tags, vec!["diabetes", "nutrition"]);
        assert!(post.symptoms.is_empty());
        assert_eq!(post.author, None);
    }

    #[test]
    fn create_keeps_supplied_values() {
        let category = Uuid::new_v4();
        let mut form = sample_form();
        form.seo_title = Some("Type 2 Diabetes Guide".into());
        form.canonical_url = Some("https://other.example.com/t2d".into());
        form.has_disclaimer = Some(false);
        form.category_id = category.to_string();
        form.reviewed_by = Some("Dr. Ada Obi".into());
        form.reading_time = Some(7);
        form.symptoms = Some(vec![SelectOption::new("thirst")]);

        let post = normalize_for_create(form, Uuid::new_v4(), "https://blog.example.com", fixed_now());
        assert_eq!(post.seo_title.as_deref(), Some("Type 2 Diabetes Guide"));
        assert_eq!(post.canonical_url.as_deref(), Some("https://other.example.com/t2d"));
        assert!(!post.has_disclaimer);
        assert_eq!(post.category_id, Some(category));
        assert_eq!(post.reviewed_by.as_deref(), Some("Dr. Ada Obi"));
        assert_eq!(post.reading_time, Some(7));
        assert_eq!(post.symptoms, vec!["thirst"]);
    }

    #[test]
    fn blank_optionals_are_treated_as_absent() {
        let mut form = sample_form();
        form.seo_title = Some("   ".into());
        form.author_profile_url = Some("".into());
        let post = normalize_for_create(form, Uuid::new_v4(), "https://b.example.com", fixed_now());
        assert_eq!(post.seo_title.as_deref(), Some("Managing Type 2 Diabetes"));
        assert_eq!(post.author_profile_url, None);
    }

    #[test]
    fn update_keeps_absent_optionals_and_resets_disclaimer() {
        let mut form = sample_form();
        form.category_id = "".into();
        form.author = Some("Jo Lane".into());
        let patch = normalize_for_update(form, Uuid::new_v4());

        assert_eq!(patch.category_id, None);
        assert_eq!(patch.author.as_deref(), Some("Jo Lane"));
        assert_eq!(patch.seo_title, None);
        assert_eq!(patch.no_index, None);
        assert!(patch.has_disclaimer);
        assert!(patch.citations.is_empty());
    }

    #[test]
    fn prepare_fills_missing_slug() {
        let mut form = sample_form();
        form.slug = " ".into();
        assert_eq!(prepare(form).slug, "managing-type-2-diabetes");
    }

    #[test]
    fn valid_form_passes() {
        assert!(validate(&sample_form()).is_ok());
    }

    #[test]
    fn validation_collects_every_problem() {
        let mut form = sample_form();
        form.title = "ab".into();
        form.status = "archived".into();
        form.medical_board_url = Some("not a url".into());
        form.reading_time = Some(-2);
        form.category_id = "cardiology".into();

        let problems = validate(&form).unwrap_err();
        assert_eq!(problems.len(), 5, "{:?}", problems);
        assert!(problems.iter().any(|p| p.starts_with("title")));
        assert!(problems.iter().any(|p| p.starts_with("medicalBoardUrl")));
    }

    #[test]
    fn empty_urls_are_allowed() {
        let mut form = sample_form();
        form.publisher_url = Some("".into());
        form.canonical_url = Some("https://blog.example.com/x".into());
        assert!(validate(&form).is_ok());
    }

    #[test]
    fn uppercase_slug_is_rejected() {
        let mut form = sample_form();
        form.slug = "Managing-Diabetes".into();
        assert!(validate(&form).is_err());
    }

    #[test]
    fn hand_written_slugs_may_repeat_dashes() {
        for slug in ["heart--health", "-flu-shots", "covid-19-"] {
            let mut form = sample_form();
            form.slug = slug.into();
            assert!(validate(&form).is_ok(), "{}", slug);
        }
        let mut form = sample_form();
        form.slug = "heart_health".into();
        assert!(validate(&form).is_err());
    }
}
