//! Per-section permalink patterns such as `/:section/:year/:slug/`.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};

use crate::error::{PageError, Result};
use crate::urls::urlize;

/// A placeholder a pattern component can name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Year,
    Month,
    MonthName,
    Day,
    Weekday,
    WeekdayName,
    YearDay,
    Section,
    Title,
    Slug,
    Filename,
}

impl Attribute {
    fn from_name(name: &str) -> Option<Self> {
        let attribute = match name {
            "year" => Attribute::Year,
            "month" => Attribute::Month,
            "monthname" => Attribute::MonthName,
            "day" => Attribute::Day,
            "weekday" => Attribute::Weekday,
            "weekdayname" => Attribute::WeekdayName,
            "yearday" => Attribute::YearDay,
            "section" => Attribute::Section,
            "title" => Attribute::Title,
            "slug" => Attribute::Slug,
            "filename" => Attribute::Filename,
            _ => return None,
        };
        Some(attribute)
    }

    fn needs_date(self) -> bool {
        matches!(
            self,
            Attribute::Year
                | Attribute::Month
                | Attribute::MonthName
                | Attribute::Day
                | Attribute::Weekday
                | Attribute::WeekdayName
                | Attribute::YearDay
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Literal(String),
    Placeholder(Attribute),
}

/// Page fields a pattern can be expanded against
#[derive(Debug, Clone, Copy)]
pub struct PermalinkFields<'a> {
    pub date: Option<DateTime<Utc>>,
    pub section: &'a str,
    pub title: &'a str,
    pub slug: &'a str,
    /// Translation base name of the source file
    pub filename: &'a str,
}

/// A validated permalink pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermalinkPattern {
    raw: String,
    components: Vec<Component>,
}

impl PermalinkPattern {
    /// Validate `pattern`, configured for `section`
    pub fn parse(section: &str, pattern: &str) -> Result<Self> {
        let components = pattern
            .split('/')
            .map(|part| match part.strip_prefix(':') {
                Some(name) if !name.is_empty() => Attribute::from_name(name)
                    .map(Component::Placeholder)
                    .ok_or_else(|| PageError::PermalinkPattern {
                        section: section.into(),
                        pattern: pattern.into(),
                        reason: format!("`:{name}` is not a known placeholder"),
                    }),
                _ => Ok(Component::Literal(part.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: pattern.to_string(),
            components,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Fill in the placeholders; fails when a date placeholder meets an undated page
    pub fn expand(&self, fields: &PermalinkFields<'_>) -> std::result::Result<String, String> {
        let mut parts = Vec::with_capacity(self.components.len());
        for component in &self.components {
            let part = match component {
                Component::Literal(text) => text.clone(),
                Component::Placeholder(attribute) => expand_attribute(*attribute, fields)?,
            };
            parts.push(part);
        }
        Ok(parts.join("/"))
    }
}

impl fmt::Display for PermalinkPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn expand_attribute(
    attribute: Attribute,
    fields: &PermalinkFields<'_>,
) -> std::result::Result<String, String> {
    if attribute.needs_date() {
        let date = fields
            .date
            .ok_or_else(|| "the page has no date for a date placeholder".to_string())?;
        return Ok(format_date(attribute, date));
    }

    let expanded = match attribute {
        Attribute::Section => fields.section.to_string(),
        Attribute::Title => urlize(fields.title),
        Attribute::Slug if !fields.slug.is_empty() => urlize(fields.slug),
        Attribute::Slug => urlize(fields.title),
        Attribute::Filename => urlize(fields.filename),
        _ => String::new(),
    };
    Ok(expanded)
}

fn format_date(attribute: Attribute, date: DateTime<Utc>) -> String {
    match attribute {
        Attribute::Year => date.format("%Y").to_string(),
        Attribute::Month => date.format("%m").to_string(),
        Attribute::MonthName => date.format("%B").to_string(),
        Attribute::Day => date.format("%d").to_string(),
        Attribute::Weekday => date.weekday().num_days_from_sunday().to_string(),
        Attribute::WeekdayName => date.format("%A").to_string(),
        Attribute::YearDay => date.ordinal().to_string(),
        _ => String::new(),
    }
}
