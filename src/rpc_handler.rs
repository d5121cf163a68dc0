//! RPC method handler for the pagekeep JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdin/stdout.
//! `handle_method` dispatches one call to the engines held by [`App`].
//! Parameters and results use the same camelCase JSON as the stored records.

use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::App;
use crate::services::boost_engine::BoostEngineTrait;
use crate::services::collection_engine::CollectionEngineTrait;
use crate::services::note_engine::NoteEngineTrait;
use crate::services::reading_list::ReadingListTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::boost::{BoostUpdate, NewBoost};
use crate::types::collection::{
    CollectionItemUpdate, CollectionUpdate, ExportFormat, NewAnnotation, NewCollectionItem,
};
use crate::types::note::{NewNote, NoteUpdate};
use crate::types::reading_list::{NewReadingItem, ReadingFilter, ReadingSearch};

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// The app lock is never held across a network fetch.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "preview.get" => {
            let url = str_param(params, "url")?;
            let previews = lock(app)?.previews.clone();
            to_json(&previews.get_preview(url).await)
        }
        _ => {
            let mut a = lock(app)?;
            dispatch(&mut a, method, params)
        }
    }
}

fn dispatch(a: &mut App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),
        "store.status" => {
            let db = a.store.database();
            Ok(json!({
                "degraded": a.store.is_degraded(),
                "reason": a.store.degraded_reason(),
                "path": db.and_then(|d| d.path()).map(|p| p.display().to_string()),
                "schemaVersion": db.map(|d| d.schema_version()),
            }))
        }

        // ─── Boosts ───
        "boost.create" => {
            let new_boost: NewBoost = from_params(params)?;
            to_json(&a.boosts.create(new_boost).map_err(|e| e.to_string())?)
        }
        "boost.createFromTemplate" => {
            let template_id = str_param(params, "templateId")?;
            let pattern = opt_str(params, "pattern");
            to_json(&a.boosts.create_from_template(template_id, pattern).map_err(|e| e.to_string())?)
        }
        "boost.update" => {
            let id = str_param(params, "id")?;
            let update: BoostUpdate = from_params(params)?;
            to_json(&a.boosts.update(id, update).map_err(|e| e.to_string())?)
        }
        "boost.toggle" => {
            let id = str_param(params, "id")?;
            let enabled = a.boosts.toggle(id).map_err(|e| e.to_string())?;
            Ok(json!({"enabled": enabled}))
        }
        "boost.delete" => {
            let id = str_param(params, "id")?;
            let deleted = a.boosts.delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"deleted": deleted}))
        }
        "boost.get" => to_json(&a.boosts.get(str_param(params, "id")?)),
        "boost.list" => to_json(&a.boosts.list()),
        "boost.forAddress" => to_json(&a.boosts.get_for_address(str_param(params, "address")?)),
        "boost.apply" => {
            let address = str_param(params, "address")?;
            to_json(&a.boosts.apply(address).map_err(|e| e.to_string())?)
        }
        "boost.templates" => match opt_str(params, "category") {
            Some(category) => to_json(&a.boosts.templates_by_category(category)),
            None => to_json(&a.boosts.templates()),
        },
        "boost.search" => to_json(&a.boosts.search(str_param(params, "query")?)),
        "boost.export" => Ok(json!({"data": a.boosts.export_json().map_err(|e| e.to_string())?})),
        "boost.import" => {
            let data = str_param(params, "data")?;
            to_json(&a.boosts.import_json(data).map_err(|e| e.to_string())?)
        }

        // ─── Collections ───
        "collection.create" => {
            let name = str_param(params, "name")?;
            let description = opt_str(params, "description");
            to_json(&a.collections.create(name, description).map_err(|e| e.to_string())?)
        }
        "collection.get" => to_json(&a.collections.get(str_param(params, "id")?)),
        "collection.list" => to_json(&a.collections.list()),
        "collection.update" => {
            let id = str_param(params, "id")?;
            let update: CollectionUpdate = from_params(params)?;
            to_json(&a.collections.update(id, update).map_err(|e| e.to_string())?)
        }
        "collection.delete" => {
            let deleted = a.collections.delete(str_param(params, "id")?).map_err(|e| e.to_string())?;
            Ok(json!({"deleted": deleted}))
        }
        "collection.duplicate" => {
            to_json(&a.collections.duplicate(str_param(params, "id")?).map_err(|e| e.to_string())?)
        }
        "collection.addItem" => {
            let collection_id = str_param(params, "collectionId")?;
            let item: NewCollectionItem = field(params, "item")?;
            to_json(&a.collections.add_item(collection_id, item).map_err(|e| e.to_string())?)
        }
        "collection.addLink" => {
            let collection_id = str_param(params, "collectionId")?;
            let url = str_param(params, "url")?;
            let item = a
                .collections
                .add_link(collection_id, url, opt_str(params, "title"), opt_str(params, "favicon"))
                .map_err(|e| e.to_string())?;
            to_json(&item)
        }
        "collection.addNote" => {
            let collection_id = str_param(params, "collectionId")?;
            let title = str_param(params, "title")?;
            let content = opt_str(params, "content").unwrap_or_default();
            to_json(&a.collections.add_note(collection_id, title, content).map_err(|e| e.to_string())?)
        }
        "collection.addScreenshot" => {
            let collection_id = str_param(params, "collectionId")?;
            let image = str_param(params, "image")?;
            let item = a
                .collections
                .add_screenshot(collection_id, image, opt_str(params, "sourceUrl"), opt_str(params, "title"))
                .map_err(|e| e.to_string())?;
            to_json(&item)
        }
        "collection.addSelectedText" => {
            let collection_id = str_param(params, "collectionId")?;
            let text = str_param(params, "text")?;
            let item = a
                .collections
                .add_selected_text(collection_id, text, opt_str(params, "sourceUrl"))
                .map_err(|e| e.to_string())?;
            to_json(&item)
        }
        "collection.updateItem" => {
            let collection_id = str_param(params, "collectionId")?;
            let item_id = str_param(params, "itemId")?;
            let update: CollectionItemUpdate = from_params(params)?;
            to_json(&a.collections.update_item(collection_id, item_id, update).map_err(|e| e.to_string())?)
        }
        "collection.removeItem" => {
            let collection_id = str_param(params, "collectionId")?;
            let item_id = str_param(params, "itemId")?;
            let removed = a.collections.remove_item(collection_id, item_id).map_err(|e| e.to_string())?;
            Ok(json!({"removed": removed}))
        }
        "collection.reorderItems" => {
            let collection_id = str_param(params, "collectionId")?;
            let item_ids: Vec<String> = field(params, "itemIds")?;
            to_json(&a.collections.reorder_items(collection_id, &item_ids).map_err(|e| e.to_string())?)
        }
        "collection.moveItem" => {
            let source_id = str_param(params, "sourceId")?;
            let item_id = str_param(params, "itemId")?;
            let target_id = str_param(params, "targetId")?;
            to_json(&a.collections.move_item(source_id, item_id, target_id).map_err(|e| e.to_string())?)
        }
        "collection.addAnnotation" => {
            let collection_id = str_param(params, "collectionId")?;
            let item_id = str_param(params, "itemId")?;
            let annotation: NewAnnotation = field(params, "annotation")?;
            let created = a
                .collections
                .add_annotation(collection_id, item_id, annotation)
                .map_err(|e| e.to_string())?;
            to_json(&created)
        }
        "collection.removeAnnotation" => {
            let collection_id = str_param(params, "collectionId")?;
            let item_id = str_param(params, "itemId")?;
            let annotation_id = str_param(params, "annotationId")?;
            let removed = a
                .collections
                .remove_annotation(collection_id, item_id, annotation_id)
                .map_err(|e| e.to_string())?;
            Ok(json!({"removed": removed}))
        }
        "collection.export" => {
            let id = str_param(params, "id")?;
            let format_name = opt_str(params, "format").unwrap_or("json");
            let format = ExportFormat::parse(format_name)
                .ok_or_else(|| format!("unsupported export format: {}", format_name))?;
            let data = a.collections.export(id, format).map_err(|e| e.to_string())?;
            Ok(json!({"format": format, "data": data}))
        }
        "collection.import" => {
            to_json(&a.collections.import_json(str_param(params, "data")?).map_err(|e| e.to_string())?)
        }
        "collection.share" => {
            let url = a.collections.share(str_param(params, "id")?).map_err(|e| e.to_string())?;
            Ok(json!({"shareUrl": url}))
        }
        "collection.unshare" => {
            a.collections.unshare(str_param(params, "id")?).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "collection.search" => to_json(&a.collections.search(str_param(params, "query")?)),
        "collection.stats" => to_json(&a.collections.stats()),

        // ─── Notes ───
        "note.create" => {
            let new_note: NewNote = from_params(params)?;
            to_json(&a.notes.create(new_note).map_err(|e| e.to_string())?)
        }
        "note.get" => to_json(&a.notes.get(str_param(params, "id")?)),
        "note.list" => to_json(&a.notes.list()),
        "note.update" => {
            let id = str_param(params, "id")?;
            let update: NoteUpdate = from_params(params)?;
            to_json(&a.notes.update(id, update).map_err(|e| e.to_string())?)
        }
        "note.delete" => {
            let deleted = a.notes.delete(str_param(params, "id")?).map_err(|e| e.to_string())?;
            Ok(json!({"deleted": deleted}))
        }
        "note.togglePinned" => {
            let pinned = a.notes.toggle_pinned(str_param(params, "id")?).map_err(|e| e.to_string())?;
            Ok(json!({"pinned": pinned}))
        }
        "note.search" => to_json(&a.notes.search(str_param(params, "query")?)),
        "note.forUrl" => to_json(&a.notes.for_url(str_param(params, "url")?).map_err(|e| e.to_string())?),
        "note.forCollection" => to_json(&a.notes.for_collection(str_param(params, "collectionId")?)),
        "note.tags" => to_json(&a.notes.all_tags()),
        "note.stats" => to_json(&a.notes.stats()),

        // ─── Reading list ───
        "reading.add" => {
            let new_item: NewReadingItem = from_params(params)?;
            to_json(&a.reading_list.add_to_list(new_item).map_err(|e| e.to_string())?)
        }
        "reading.get" => to_json(&a.reading_list.get_item(str_param(params, "id")?)),
        "reading.list" => {
            let filter: ReadingFilter = match params.get("filter") {
                Some(Value::Null) | None => ReadingFilter::default(),
                Some(_) => field(params, "filter")?,
            };
            to_json(&a.reading_list.list(filter))
        }
        "reading.updateProgress" => {
            let id = str_param(params, "id")?;
            let progress = params
                .get("progress")
                .and_then(Value::as_f64)
                .ok_or("missing progress")?;
            to_json(&a.reading_list.update_progress(id, progress).map_err(|e| e.to_string())?)
        }
        "reading.markRead" => {
            to_json(&a.reading_list.mark_read(str_param(params, "id")?).map_err(|e| e.to_string())?)
        }
        "reading.markUnread" => {
            to_json(&a.reading_list.mark_unread(str_param(params, "id")?).map_err(|e| e.to_string())?)
        }
        "reading.saveOffline" => {
            let id = str_param(params, "id")?;
            let html = str_param(params, "html")?;
            to_json(&a.reading_list.save_offline(id, html).map_err(|e| e.to_string())?)
        }
        "reading.removeOffline" => {
            to_json(&a.reading_list.remove_offline(str_param(params, "id")?).map_err(|e| e.to_string())?)
        }
        "reading.delete" => {
            let deleted = a.reading_list.delete(str_param(params, "id")?).map_err(|e| e.to_string())?;
            Ok(json!({"deleted": deleted}))
        }
        "reading.toggleFavorite" => {
            let favorite = a
                .reading_list
                .toggle_favorite(str_param(params, "id")?)
                .map_err(|e| e.to_string())?;
            Ok(json!({"favorite": favorite}))
        }
        "reading.search" => {
            let search: ReadingSearch = from_params(params)?;
            to_json(&a.reading_list.search(&search))
        }
        "reading.stats" => to_json(&a.reading_list.stats()),
        "reading.tags" => to_json(&a.reading_list.all_tags()),

        // ─── Link previews ───
        "preview.invalidate" => {
            a.previews.invalidate(str_param(params, "url")?);
            Ok(json!({"ok": true}))
        }
        "preview.clear" => {
            a.previews.clear_cache();
            Ok(json!({"ok": true}))
        }

        // ─── Settings ───
        "settings.get" => to_json(a.settings_engine.get_settings()),
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            let restart_required = a.apply_settings();
            Ok(json!({"ok": true, "restartRequired": restart_required}))
        }
        "settings.reset" => {
            a.settings_engine.reset().map_err(|e| e.to_string())?;
            let restart_required = a.apply_settings();
            Ok(json!({"ok": true, "restartRequired": restart_required}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

fn lock(app: &Mutex<App>) -> Result<MutexGuard<'_, App>, String> {
    app.lock().map_err(|e| e.to_string())
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing {}", key))
}

fn opt_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

fn field<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, String> {
    let value = params.get(key).cloned().ok_or_else(|| format!("missing {}", key))?;
    serde_json::from_value(value).map_err(|e| format!("invalid {}: {}", key, e))
}

fn from_params<T: DeserializeOwned>(params: &Value) -> Result<T, String> {
    serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}
