//! Copies node infos onto view content and clears them again.
//!
//! Drawables have nothing to set; only views and hosts carry attributes.

use crate::content::{Content, LayoutDirection, NativeView, ViewState};
use crate::mount_item::MountItem;
use crate::node_info::{ImportantForAccessibility, NodeInfo, ViewNodeInfo};
use crate::rect::Edges;

/// Applies the item’s node infos and accessibility importance to its content.
pub fn set_view_attributes(item: &MountItem) {
    let view = match item.content().and_then(Content::as_view) {
        Some(view) => view,
        None => return,
    };
    if let Some(info) = item.node_info() {
        set_node_info(view, info);
    }
    if let Some(info) = item.view_node_info() {
        set_view_node_info(view, info);
    }
    if item.important_for_accessibility() != ImportantForAccessibility::Auto {
        view.props().important_for_accessibility = item.important_for_accessibility();
    }
}

/// Reverts everything [`set_view_attributes`] set for the same item.
pub fn unset_view_attributes(item: &MountItem) {
    let view = match item.content().and_then(Content::as_view) {
        Some(view) => view,
        None => return,
    };
    if let Some(info) = item.node_info() {
        unset_node_info(view, info);
    }
    if let Some(info) = item.view_node_info() {
        unset_view_node_info(view, info);
    }
    view.props().important_for_accessibility = ImportantForAccessibility::Auto;
}

fn set_node_info(view: &NativeView, info: &NodeInfo) {
    let mut props = view.props();

    if let Some(handler) = info.click_handler() {
        props.click_handler = Some(handler.clone());
        props.clickable = true;
    }
    if let Some(handler) = info.long_click_handler() {
        props.long_click_handler = Some(handler.clone());
        props.long_clickable = true;
    }
    if let Some(handler) = info.focus_change_handler() {
        props.focus_change_handler = Some(handler.clone());
    }
    if let Some(handler) = info.touch_handler() {
        props.touch_handler = Some(handler.clone());
    }
    if let Some(handler) = info.intercept_touch_handler() {
        props.intercept_touch_handler = Some(handler.clone());
    }
    if info.has_accessibility_handlers() {
        props.accessibility_handlers = Some(info.accessibility_handlers().clone());
    }

    if let Some(description) = info.content_description() {
        props.content_description = Some(description.clone());
    }
    if let Some(tag) = info.view_tag() {
        props.tag = Some(tag.clone());
    }
    if let Some(tags) = info.view_tags() {
        for (key, tag) in tags.iter() {
            props.tags.insert(*key, tag.clone());
        }
    }

    if let Some(focusable) = info.focusable() {
        props.focusable = focusable;
    }
    if let Some(enabled) = info.enabled() {
        props.state.set(ViewState::ENABLED, enabled);
    }
    if let Some(selected) = info.selected() {
        props.state.set(ViewState::SELECTED, selected);
    }
}

fn unset_node_info(view: &NativeView, info: &NodeInfo) {
    let mut props = view.props();

    if info.click_handler().is_some() {
        props.click_handler = None;
        props.clickable = false;
    }
    if info.long_click_handler().is_some() {
        props.long_click_handler = None;
        props.long_clickable = false;
    }
    if info.focus_change_handler().is_some() {
        props.focus_change_handler = None;
    }
    if info.touch_handler().is_some() {
        props.touch_handler = None;
    }
    if info.intercept_touch_handler().is_some() {
        props.intercept_touch_handler = None;
    }
    if info.has_accessibility_handlers() {
        props.accessibility_handlers = None;
    }

    if info.content_description().is_some() {
        props.content_description = None;
    }
    if info.view_tag().is_some() {
        props.tag = None;
    }
    if let Some(tags) = info.view_tags() {
        for key in tags.keys() {
            props.tags.remove(key);
        }
    }

    if info.focusable().is_some() {
        props.focusable = false;
    }
    if info.enabled().is_some() {
        props.state.insert(ViewState::ENABLED);
    }
    if info.selected().is_some() {
        props.state.remove(ViewState::SELECTED);
    }
}

fn set_view_node_info(view: &NativeView, info: &ViewNodeInfo) {
    let mut props = view.props();
    if let Some(background) = info.background() {
        props.background = Some(background.clone());
    }
    if let Some(foreground) = info.foreground() {
        props.foreground = Some(foreground.clone());
    }
    if let Some(padding) = info.padding() {
        props.padding = padding;
    }
    if let Some(direction) = info.layout_direction() {
        props.layout_direction = direction;
    }
}

fn unset_view_node_info(view: &NativeView, info: &ViewNodeInfo) {
    let mut props = view.props();
    if info.background().is_some() {
        props.background = None;
    }
    if info.foreground().is_some() {
        props.foreground = None;
    }
    if info.padding().is_some() {
        props.padding = Edges::default();
    }
    if info.layout_direction().is_some() {
        props.layout_direction = LayoutDirection::Inherit;
    }
}
