// This file is part of the product Wikid.
// SPDX-FileCopyrightText: 2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::app_state::AppState;
use actix_web::{HttpResponse, web};
use log::{error, warn};
use serde::{Deserialize, Serialize};

pub(super) const MSG_PAGE_MISSING: &str = "Page does not exist.";
pub(super) const MSG_WRITE_FAILED: &str = "Could not write page.";

#[derive(Serialize)]
struct PageResponse {
    status: &'static str,
    body: String,
}

#[derive(Serialize)]
struct PageListResponse {
    status: &'static str,
    pages: Vec<String>,
}

#[derive(Serialize)]
pub(super) struct ErrorResponse {
    pub(super) status: &'static str,
    pub(super) message: &'static str,
}

#[derive(Deserialize)]
struct PutPageRequest {
    body: Option<String>,
}

pub(super) fn json_error(message: &'static str) -> HttpResponse {
    // The legacy client only inspects the envelope, so error responses keep
    // HTTP 200 like the original API did.
    HttpResponse::Ok().json(ErrorResponse {
        status: "error",
        message,
    })
}

pub async fn get_page(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let slug = path.into_inner();
    match state.wiki.get_page(&slug) {
        Ok(page) => HttpResponse::Ok().json(PageResponse {
            status: "ok",
            body: page.body,
        }),
        Err(err) => {
            warn!("Page read for '{}' rejected: {}", slug, err);
            json_error(MSG_PAGE_MISSING)
        }
    }
}

pub async fn put_page(
    path: web::Path<String>,
    payload: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let slug = path.into_inner();

    // Decoded by hand so a malformed request still gets the envelope
    // instead of a framework-generated 400.
    let body = match serde_json::from_slice::<PutPageRequest>(&payload) {
        Ok(PutPageRequest { body: Some(body) }) => body,
        Ok(PutPageRequest { body: None }) => {
            warn!("Page write for '{}' rejected: missing body field", slug);
            return json_error(MSG_WRITE_FAILED);
        }
        Err(err) => {
            warn!("Page write for '{}' rejected: {}", slug, err);
            return json_error(MSG_WRITE_FAILED);
        }
    };

    match state.wiki.put_page(&slug, &body) {
        Ok(page) => HttpResponse::Ok().json(PageResponse {
            status: "ok",
            body: page.body,
        }),
        Err(err) => {
            error!("Page write for '{}' failed: {}", slug, err);
            json_error(MSG_WRITE_FAILED)
        }
    }
}

pub async fn list_pages(state: web::Data<AppState>) -> HttpResponse {
    let pages = match state.wiki.list_pages() {
        Ok(pages) => pages,
        Err(err) => {
            error!("Page enumeration failed: {}", err);
            Vec::new()
        }
    };
    HttpResponse::Ok().json(PageListResponse {
        status: "ok",
        pages,
    })
}
