use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
};

/// The form previews the files by default. The import button sends the same
/// files straight to the import endpoint.
fn import_form_view() -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            id="import-form"
            hx-post=(endpoints::IMPORT_PREVIEW)
            hx-encoding="multipart/form-data"
            enctype="multipart/form-data"
            hx-disabled-elt="#files, #submit-button, #import-button"
            hx-indicator="#indicator"
            hx-target="#import-preview"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="files" class=(FORM_LABEL_STYLE)
                {
                    "Choose file(s) to upload"
                }

                input
                    id="files"
                    type="file"
                    name="files"
                    accept=".csv,.pdf,text/csv,application/pdf"
                    multiple
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex flex-col gap-2 sm:flex-row"
            {
                button
                    type="submit"
                    id="submit-button"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" id="indicator" { (spinner) }
                    " Preview"
                }

                button
                    type="button"
                    id="import-button"
                    hx-post=(endpoints::IMPORT)
                    hx-validate="true"
                    hx-target="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Import Without Preview"
                }
            }
        }
    }
}

fn import_help_view() -> Markup {
    html! {
        section class="space-y-3 text-sm text-gray-700 dark:text-gray-300"
        {
            h2 class="text-lg font-semibold text-gray-900 dark:text-white" { "CSV files" }

            p
            {
                "The first row must name the columns. "
                code { "date" } ", " code { "description" } " and " code { "amount" }
                " are required, " code { "category" } ", " code { "type" } ", "
                code { "account" } " and " code { "notes" } " are optional."
            }

            pre class="p-2 rounded bg-gray-100 dark:bg-gray-700 overflow-x-auto"
            {
                "date,description,amount,category,type\n"
                "2026-01-15,Grocery Store,125.50,Food & Groceries,expense"
            }

            p
            {
                "Without a type column, negative amounts are treated as income. "
                "Rows that cannot be read are skipped and listed after the upload."
            }

            h2 class="text-lg font-semibold text-gray-900 dark:text-white" { "PDF statements" }

            p
            {
                "Transactions are read from the text of the statement on a best-effort basis. "
                "Check the imported transactions afterwards."
            }

            p
            {
                "Uploading shows a preview of the transactions first. Nothing is saved until you import them. "
                "Transactions without a category are categorised with your "
                a href=(endpoints::RULES_VIEW) class=(LINK_STYLE) { "keyword rules" }
                ". Importing the same file twice adds the transactions twice."
            }
        }
    }
}

fn import_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::IMPORT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 lg:max-w-3xl lg:w-full lg:mx-auto"
            {
                h1 class="text-xl font-bold" { "Import Transactions" }

                div class=(CARD_STYLE)
                {
                    (import_form_view())
                }

                div id="import-preview" {}

                div class=(CARD_STYLE)
                {
                    (import_help_view())
                }
            }
        }
    };

    base("Import Transactions", &[], &content)
}

/// Route handler for the import page.
pub async fn get_import_page() -> Response {
    import_view().into_response()
}
