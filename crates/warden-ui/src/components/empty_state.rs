//! Panel shown in place of table rows.
//!
//! # Design
//! - The tone picks the glyph and the live-region role: failures are announced
//!   as alerts, everything else as status.
//! - Escape actions (clear search, reset filters, retry) arrive as children.

use yew::prelude::*;

/// Why the panel is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum PanelTone {
    /// Nothing to show yet.
    #[default]
    Neutral,
    /// Search or filters hide every record.
    Filtered,
    /// A load failed or the console cannot run.
    Failed,
}

impl PanelTone {
    const fn glyph(self) -> &'static str {
        match self {
            Self::Neutral => "○",
            Self::Filtered => "⌕",
            Self::Failed => "!",
        }
    }

    const fn class(self) -> &'static str {
        match self {
            Self::Neutral => "tone-neutral",
            Self::Filtered => "tone-filtered",
            Self::Failed => "tone-failed",
        }
    }

    const fn role(self) -> &'static str {
        match self {
            Self::Failed => "alert",
            Self::Neutral | Self::Filtered => "status",
        }
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct EmptyStateProps {
    pub title: AttrValue,
    #[prop_or_default]
    pub description: Option<AttrValue>,
    #[prop_or_default]
    pub tone: PanelTone,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(EmptyState)]
pub(crate) fn empty_state(props: &EmptyStateProps) -> Html {
    let tone = props.tone;
    html! {
        <div class={classes!("empty-state", tone.class())} role={tone.role()}>
            <span class="empty-glyph" aria-hidden="true">{tone.glyph()}</span>
            <h4>{props.title.clone()}</h4>
            {props.description.clone().map(|text| html! {
                <p class="muted">{text}</p>
            }).unwrap_or_default()}
            {if props.children.is_empty() {
                html! {}
            } else {
                html! { <div class="empty-actions">{ for props.children.iter() }</div> }
            }}
        </div>
    }
}
