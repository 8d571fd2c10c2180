// This file is part of the product Wikid.
// SPDX-FileCopyrightText: 2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::app_state::AppState;
use actix_web::{HttpResponse, web};
use log::warn;
use serde::Serialize;

#[derive(Serialize)]
struct TagListResponse {
    status: &'static str,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct TagPagesResponse {
    status: &'static str,
    tag: String,
    pages: Vec<String>,
}

pub async fn list_tags(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(TagListResponse {
        status: "ok",
        tags: state.wiki.list_tags(),
    })
}

pub async fn pages_for_tag(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let tag = path.into_inner();
    let pages = match state.wiki.list_pages_for_tag(&tag) {
        Ok(pages) => pages,
        Err(err) => {
            warn!("Tag lookup for '{}' rejected: {}", tag, err);
            Vec::new()
        }
    };
    HttpResponse::Ok().json(TagPagesResponse {
        status: "ok",
        tag,
        pages,
    })
}
