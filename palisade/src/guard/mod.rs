// This file is part of the product Palisade.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod decision;
mod middleware;

pub use decision::{decide, is_auth_route, is_protected_route};
pub use middleware::{AuthRedirects, AuthRedirectsMiddleware};
