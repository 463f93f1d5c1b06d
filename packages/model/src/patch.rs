//! Partial attribute patches.
//!
//! Patches never touch structure: ids, container children and grid cells
//! only change through the mutation operations. A field that doesn't apply
//! to the target's kind (e.g. `url` on a text block) is ignored.

use crate::block::{Block, BlockKind, BlockStyle, ButtonVariant, EventBindings};
use crate::error::{ModelError, ModelResult};
use crate::grid::{
    checked_cell_count, reshape_cells, GridAlign, GridCell, GridJustify, GridSettings, PlacementType,
};
use crate::tree::{Footer, Header};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockPatch {
    /// Merged key by key; an empty value removes the key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<BlockStyle>,
    /// Blank clears the anchor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_id: Option<String>,
    /// Per trigger; an empty list removes the trigger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<EventBindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Empty clears the color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<ButtonVariant>,
}

impl BlockPatch {
    pub fn style(style: BlockStyle) -> Self {
        Self {
            style: Some(style),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, block: &mut Block) {
        if let Some(style) = &self.style {
            block.style.merge(style);
        }

        if let Some(html_id) = &self.html_id {
            let trimmed = html_id.trim();
            block.html_id = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }

        if let Some(events) = &self.events {
            for (trigger, functions) in events {
                if functions.is_empty() {
                    block.events.remove(trigger);
                } else {
                    block.events.insert(trigger.clone(), functions.clone());
                }
            }
        }

        match &mut block.kind {
            BlockKind::Text { content } => {
                if let Some(value) = &self.content {
                    *content = value.clone();
                }
            }
            BlockKind::Image { url } | BlockKind::Video { url } => {
                if let Some(value) = &self.url {
                    *url = value.clone();
                }
            }
            BlockKind::Button {
                text,
                link,
                button_color,
                variant,
            } => {
                if let Some(value) = &self.text {
                    *text = value.clone();
                }
                if let Some(value) = &self.link {
                    *link = value.clone();
                }
                if let Some(value) = &self.button_color {
                    *button_color = (!value.is_empty()).then(|| value.clone());
                }
                if let Some(value) = self.variant {
                    *variant = Some(value);
                }
            }
            BlockKind::Container { .. } | BlockKind::Grid { .. } => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridSettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_x: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_y: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<GridAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justify: Option<GridJustify>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_type: Option<PlacementType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_cell_borders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_border_width: Option<u32>,
}

impl GridSettingsPatch {
    pub fn shape(columns: u32, rows: u32) -> Self {
        Self {
            columns: Some(columns),
            rows: Some(rows),
            ..Self::default()
        }
    }

    /// Apply to a grid, re-deriving `cells` when the shape changes.
    /// Zero columns or rows are clamped to one. A shape over the cell limit
    /// is refused and leaves the grid untouched.
    pub fn apply_to(&self, settings: &mut GridSettings, cells: &mut Vec<GridCell>) -> ModelResult<()> {
        let columns = self.columns.unwrap_or(settings.columns);
        let rows = self.rows.unwrap_or(settings.rows);
        if checked_cell_count(columns, rows).is_none() {
            return Err(ModelError::GridTooLarge { columns, rows });
        }

        let previous = settings.clone();

        if let Some(columns) = self.columns {
            settings.columns = columns.max(1);
        }
        if let Some(rows) = self.rows {
            settings.rows = rows.max(1);
        }
        if let Some(gap_x) = self.gap_x {
            settings.gap_x = gap_x;
        }
        if let Some(gap_y) = self.gap_y {
            settings.gap_y = gap_y;
        }
        if let Some(align) = self.align {
            settings.align = Some(align);
        }
        if let Some(justify) = self.justify {
            settings.justify = Some(justify);
        }
        if let Some(placement_type) = self.placement_type {
            settings.placement_type = Some(placement_type);
        }
        if let Some(show) = self.show_cell_borders {
            settings.show_cell_borders = Some(show);
        }
        if let Some(color) = &self.cell_border_color {
            settings.cell_border_color = Some(color.clone());
        }
        if let Some(width) = self.cell_border_width {
            settings.cell_border_width = Some(width);
        }

        let shape_changed = previous.columns != settings.columns || previous.rows != settings.rows;
        if shape_changed || cells.len() != settings.cell_count() {
            *cells = reshape_cells(std::mem::take(cells), &previous, settings);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl HeaderPatch {
    pub fn apply_to(&self, header: &mut Header) {
        merge_optional(&mut header.logo_url, &self.logo_url);
        merge_optional(&mut header.company_name, &self.company_name);
        merge_optional(&mut header.background_color, &self.background_color);
        merge_optional(&mut header.text_color, &self.text_color);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl FooterPatch {
    pub fn apply_to(&self, footer: &mut Footer) {
        if let Some(text) = &self.text {
            footer.text = text.clone();
        }
        merge_optional(&mut footer.background_color, &self.background_color);
        merge_optional(&mut footer.text_color, &self.text_color);
    }
}

// Empty string clears an optional attribute
fn merge_optional(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *target = (!value.is_empty()).then(|| value.clone());
    }
}
