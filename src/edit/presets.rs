use crate::foundation::error::CertError;
use crate::scene::color::Paint;
use crate::scene::element::{Element, OriginX, OriginY, TextAlign, TextField};
use std::str::FromStr;

/// Ready-made certificate fields, each bound to a well-known placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldPreset {
    /// Large recipient name line.
    RecipientName,
    /// Course or achievement title.
    CourseName,
    /// Issue date.
    Date,
}

impl FieldPreset {
    /// Every preset, in the order a template usually stacks them.
    pub const ALL: [FieldPreset; 3] = [Self::RecipientName, Self::CourseName, Self::Date];

    /// Placeholder name the preset binds to.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::RecipientName => "recipientName",
            Self::CourseName => "courseName",
            Self::Date => "date",
        }
    }

    /// Centered text element carrying `{{placeholder}}` as content, anchored at `center_x`.
    pub fn element(self, center_x: f64) -> Element {
        let (family, size, y, fill) = match self {
            Self::RecipientName => ("Georgia", 48.0, 400.0, Paint::parse("#1F2937")),
            Self::CourseName => ("Georgia", 28.0, 550.0, Paint::parse("#4F46E5")),
            Self::Date => ("Arial", 18.0, 650.0, Paint::parse("#6B7280")),
        };
        let mut field = TextField::new(format!("{{{{{}}}}}", self.placeholder()));
        field.font_family = family.to_string();
        field.font_size = size;
        field.fill = fill.unwrap_or(Paint::BLACK);
        field.align = TextAlign::Center;
        Element::text(field)
            .at(center_x, y)
            .with_origin(OriginX::Center, OriginY::Top)
    }
}

impl FromStr for FieldPreset {
    type Err = CertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recipient-name" | "recipientName" => Ok(Self::RecipientName),
            "course-name" | "courseName" => Ok(Self::CourseName),
            "date" => Ok(Self::Date),
            other => Err(CertError::validation(format!(
                "unknown field preset \"{other}\" (expected recipient-name, course-name or date)"
            ))),
        }
    }
}
