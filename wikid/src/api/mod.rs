// This file is part of the product Wikid.
// SPDX-FileCopyrightText: 2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

pub mod pages;
pub mod tags;


pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/page/{slug}", web::get().to(pages::get_page))
        .route("/api/page/{slug}", web::post().to(pages::put_page))
        .route("/api/pages/all", web::get().to(pages::list_pages))
        .route("/api/tags/all", web::get().to(tags::list_tags))
        .route("/api/tags/{tag}", web::get().to(tags::pages_for_tag));
}
