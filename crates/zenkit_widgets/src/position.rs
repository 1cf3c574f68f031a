//! Floating element positioning
//!
//! Pure functions computing where a tooltip, popover or dropdown menu goes
//! relative to its trigger. No document access: callers pass the measured
//! rectangles, which keeps the math testable without a layout engine.

use std::str::FromStr;

use zenkit_core::{Point, Rect, Size, ZenkitError};

/// Side of the trigger a floating element is placed on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Right => "right",
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, Placement::Top | Placement::Bottom)
    }
}

impl FromStr for Placement {
    type Err = ZenkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top" => Ok(Placement::Top),
            "bottom" => Ok(Placement::Bottom),
            "left" => Ok(Placement::Left),
            "right" => Ok(Placement::Right),
            other => Err(ZenkitError::InvalidOption {
                name: "placement".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Result of [`compute_position`], in page coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatingPosition {
    pub top: f32,
    pub left: f32,
    /// Side actually used after flipping
    pub placement: Placement,
    /// Arrow offset from the floating element's left edge (top/bottom only)
    pub arrow_left: Option<f32>,
}

/// Place a floating element of size `floating` next to `trigger`.
///
/// `trigger` is in client coordinates (relative to the viewport); `scroll` is
/// added so the result is in page coordinates. Horizontal overflow clamps to
/// the viewport with `spacing` as the margin; a top placement that would rise
/// above the visible area flips to bottom.
pub fn compute_position(
    trigger: Rect,
    floating: Size,
    placement: Placement,
    viewport: Size,
    scroll: Point,
    spacing: f32,
) -> FloatingPosition {
    let centered_left = trigger.left() + (trigger.width() - floating.width) / 2.0;
    let centered_top = trigger.top() + (trigger.height() - floating.height) / 2.0;

    let (top, left) = match placement {
        Placement::Top => (trigger.top() - floating.height - spacing, centered_left),
        Placement::Bottom => (trigger.bottom() + spacing, centered_left),
        Placement::Left => (centered_top, trigger.left() - floating.width - spacing),
        Placement::Right => (centered_top, trigger.right() + spacing),
    };
    let mut top = top + scroll.y;
    let mut left = left + scroll.x;
    let mut resolved = placement;

    if left < 0.0 {
        left = spacing;
    }
    if left + floating.width > viewport.width {
        left = viewport.width - floating.width - spacing;
    }
    if placement == Placement::Top && top < scroll.y {
        top = trigger.bottom() + spacing + scroll.y;
        resolved = Placement::Bottom;
    }

    let arrow_left = resolved
        .is_vertical()
        .then(|| trigger.center().x - (left - scroll.x));

    FloatingPosition {
        top,
        left,
        placement: resolved,
        arrow_left,
    }
}

/// Direction a dropdown menu opens, from the wrapper class
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DropDirection {
    #[default]
    Down,
    Up,
    End,
    Start,
}

impl DropDirection {
    /// Direction declared by a `dropup`/`dropend`/`dropstart` wrapper class
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut direction = DropDirection::Down;
        for class in classes {
            match class {
                "dropup" => return DropDirection::Up,
                "dropend" => direction = DropDirection::End,
                "dropstart" => direction = DropDirection::Start,
                _ => {}
            }
        }
        direction
    }
}

/// CSS offsets for a dropdown menu; `None` leaves the property unset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuPlacement {
    pub top: Option<&'static str>,
    pub left: Option<&'static str>,
    pub right: Option<&'static str>,
    pub bottom: Option<&'static str>,
}

/// Offsets for a menu opening in `direction`, pinned to the right edge when
/// `menu` (client rect) overflows horizontally and flipped upward when it
/// overflows the bottom
pub fn menu_placement(direction: DropDirection, menu: Rect, viewport: Size) -> MenuPlacement {
    let mut placement = match direction {
        DropDirection::Down => MenuPlacement {
            top: Some("100%"),
            ..Default::default()
        },
        DropDirection::Up => MenuPlacement {
            top: Some("auto"),
            bottom: Some("100%"),
            ..Default::default()
        },
        DropDirection::End => MenuPlacement {
            top: Some("0"),
            left: Some("100%"),
            ..Default::default()
        },
        DropDirection::Start => MenuPlacement {
            top: Some("0"),
            left: Some("auto"),
            right: Some("100%"),
            ..Default::default()
        },
    };

    if menu.right() > viewport.width {
        placement.right = Some("0");
        placement.left = Some("auto");
    }
    if menu.bottom() > viewport.height && direction != DropDirection::Up {
        placement.bottom = Some("100%");
        placement.top = Some("auto");
    }
    placement
}
