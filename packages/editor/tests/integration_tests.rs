//! Integration tests for editor crate

use pagecraft_editor::{Document, EditSession, EditorError, EditorOptions, Mutation};
use pagecraft_model::{
    Block, BlockTree, BlockType, FooterPatch, GridSettingsPatch, HeaderPatch, FOOTER_ID,
};
use std::sync::Arc;

fn doc(blocks: Vec<Block>) -> Document {
    Document::from_tree(BlockTree::from_blocks(blocks), &EditorOptions::default()).unwrap()
}

#[test]
fn test_document_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.json");
    std::fs::write(
        &path,
        r#"{
            "header": { "companyName": "Acme" },
            "blocks": [
                { "id": "intro", "type": "text", "content": "Hello", "style": { "color": "red" } },
                { "id": "row", "type": "grid",
                  "settings": { "columns": 2, "rows": 1, "gapX": 8, "gapY": 8 },
                  "cells": [ { "block": null } ] }
            ],
            "footer": { "text": "© Acme" }
        }"#,
    )
    .unwrap();

    let mut doc = Document::load(&path, &EditorOptions::default()).unwrap();
    assert_eq!(doc.version(), 0);
    assert!(!doc.is_dirty());

    // The short cell array was repaired on load
    assert_eq!(doc.block("row").unwrap().cells().unwrap().len(), 2);

    doc.add_block_to_grid_cell("row", 1, BlockType::Button).unwrap();
    assert!(doc.is_dirty());

    doc.save().unwrap();
    assert!(!doc.is_dirty());

    let reloaded = Document::load(&path, &EditorOptions::default()).unwrap();
    assert_eq!(reloaded.tree(), doc.tree());
    assert_eq!(reloaded.tree().header.company_name.as_deref(), Some("Acme"));
}

#[test]
fn test_load_rejects_duplicate_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.json");
    std::fs::write(
        &path,
        r#"{ "blocks": [
            { "id": "x", "type": "text" },
            { "id": "box", "type": "container", "children": [ { "id": "x", "type": "video" } ] }
        ] }"#,
    )
    .unwrap();

    let result = Document::load(&path, &EditorOptions::default());
    assert!(matches!(result, Err(EditorError::Model(_))));
}

#[test]
fn test_reopened_document_never_reuses_ids() {
    let options = EditorOptions::for_client("alice");
    let mut first = Document::new(&options);
    first.add_block(BlockType::Text).unwrap();
    first.add_block(BlockType::Text).unwrap();
    let oldest = first.tree().ids()[0].clone();
    first.delete_block(&oldest).unwrap();

    let mut reopened = Document::from_json(&first.to_json().unwrap(), &options).unwrap();
    reopened.add_block(BlockType::Text).unwrap();

    let ids = reopened.tree().ids();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert!(ids[1].ends_with("-3"), "{}", ids[1]);
}

// moveBlock(0, 2) on [A, B, C] gives [B, C, A]
#[test]
fn test_move_block_array_move() {
    let mut doc = doc(vec![
        Block::text("A", ""),
        Block::text("B", ""),
        Block::text("C", ""),
    ]);

    doc.move_block(0, 2).unwrap();
    assert_eq!(doc.tree().ids(), vec!["B", "C", "A"]);
}

// 2x1 grid resized to 3x1 keeps both blocks at 0 and 1
#[test]
fn test_grid_resize_preserves_cells() {
    let mut doc = doc(vec![Block::grid(
        "g",
        2,
        1,
        vec![Some(Block::text("x", "")), Some(Block::text("y", ""))],
    )]);

    doc.update_grid_settings("g", GridSettingsPatch::shape(3, 1)).unwrap();

    let cells = doc.block("g").unwrap().cells().unwrap();
    assert_eq!(cells.len(), 3);
    assert_eq!(cells[0].block.as_ref().unwrap().id, "x");
    assert_eq!(cells[1].block.as_ref().unwrap().id, "y");
    assert!(cells[2].is_empty());
}

// Deleting a container removes the grid and its four leaves too
#[test]
fn test_delete_container_removes_subtree() {
    let grid = Block::grid(
        "g",
        2,
        2,
        (0..4).map(|i| Some(Block::text(format!("leaf-{}", i), ""))).collect(),
    );
    let mut doc = doc(vec![Block::text("keep", ""), Block::container("box", vec![grid])]);
    assert_eq!(doc.tree().block_count(), 7);

    doc.select(Some("leaf-2"));
    doc.delete_block("box").unwrap();

    assert_eq!(doc.tree().block_count(), 1);
    assert_eq!(doc.tree().ids(), vec!["keep"]);
    assert_eq!(doc.selection(), None);
}

#[test]
fn test_delete_from_grid_keeps_cell() {
    let mut doc = doc(vec![Block::grid("g", 2, 1, vec![Some(Block::text("x", ""))])]);
    doc.delete_block("x").unwrap();

    let cells = doc.block("g").unwrap().cells().unwrap();
    assert_eq!(cells.len(), 2);
    assert!(cells.iter().all(|c| c.is_empty()));
}

#[test]
fn test_header_and_footer_updates() {
    let mut doc = doc(vec![]);
    doc.select(Some(FOOTER_ID));

    doc.update_header(HeaderPatch {
        logo_url: Some("/logo.svg".to_string()),
        ..HeaderPatch::default()
    })
    .unwrap();
    doc.update_footer(FooterPatch {
        text: Some("All rights reserved".to_string()),
        ..FooterPatch::default()
    })
    .unwrap();

    assert_eq!(doc.tree().header.logo_url.as_deref(), Some("/logo.svg"));
    assert_eq!(doc.tree().footer.text, "All rights reserved");
    assert_eq!(doc.selection(), Some(FOOTER_ID));
    assert_eq!(doc.version(), 2);
}

#[test]
fn test_failed_apply_is_unobservable() {
    let mut doc = doc(vec![Block::grid("g", 1, 1, vec![])]);
    let before = doc.snapshot();

    let result = doc.apply(Mutation::SetGridCellBlock {
        grid_id: "g".to_string(),
        cell_index: 5,
        block: Block::text("n", ""),
    });

    assert!(result.is_err());
    assert!(Arc::ptr_eq(&before, &doc.snapshot()));
    assert_eq!(doc.version(), 0);
}

#[test]
fn test_edit_session_workflow() {
    let tree = BlockTree::from_blocks(vec![Block::container("box", vec![])]);
    let server_doc = Document::from_tree(tree.clone(), &EditorOptions::for_client("server")).unwrap();
    let mut server = EditSession::new("server", server_doc);
    let mut client = EditSession::new(
        "client",
        Document::from_tree(tree, &EditorOptions::for_client("client")).unwrap(),
    );

    let envelope = client
        .edit(|doc| doc.add_block_to_container("box", 0, BlockType::Image))
        .unwrap();
    assert_eq!(client.pending_count(), 1);

    // Round trip through JSON, as a transport would
    let wire = serde_json::to_string(&envelope).unwrap();
    let received = serde_json::from_str(&wire).unwrap();
    server.apply_remote(&received).unwrap();

    // The sequencer echoes it back
    assert!(client.apply_remote(&received).is_none());
    assert_eq!(client.pending_count(), 0);
    assert_eq!(client.document.tree(), server.document.tree());
}
