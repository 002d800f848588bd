/*!
# Growthsheet

A single-page data-entry form that appends child-growth measurements to a
Google Sheets worksheet.

## Overview

One operator fills in a record — child name, sex, age in months, height in
centimeters — plus the target spreadsheet URL and worksheet name. The server
runs a full read-modify-write against the Sheets v4 API: fetch the first
four columns of the worksheet, drop fully-empty rows, append the record as
the last row, and write the whole table back starting at A1.

## Architecture

- **Web layer**: axum serving the embedded form page and a single
  `POST /api/submit` JSON endpoint. Every outcome comes back as
  `{status, message}` and the form stays usable after failures.
- **Append operation**: the six-step read-modify-append-write sequence,
  expressed over a small backend trait so it can be exercised without the
  network.
- **Sheets client**: a thin reqwest wrapper over the Sheets v4 REST API
  (worksheet titles, `values.get`, `values.update`), built once at startup
  and passed in explicitly.
- **Auth**: service-account key from the environment, exchanged for scoped
  access tokens via the RS256 JWT-bearer grant and cached until near
  expiry.

## Modules

- **record**: the four-field record, sex enum, field validation
- **table**: the worksheet table (header + rows, empty-row pruning)
- **auth**: service-account credential and token provider
- **sheets**: Sheets v4 REST client and error types
- **append**: the append operation and its backend trait
- **app**: routing and handlers

## Known limits

Submissions are serial per request and unguarded across clients: two
operators racing on the same worksheet are last-writer-wins. The write-back
is one `values.update` call; a failure inside that call can leave a partial
overwrite. Both are accepted for a low-traffic single-operator tool.
*/

pub mod app;
pub mod append;
pub mod auth;
pub mod record;
pub mod sheets;
pub mod table;

/// Re-export everything from these modules to make it easier to use
pub use append::*;
pub use auth::*;
pub use record::*;
pub use sheets::*;
pub use table::*;
