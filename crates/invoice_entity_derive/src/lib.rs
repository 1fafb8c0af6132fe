use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{
    Expr, ExprLit, Fields, Ident, ItemStruct, Lit, Meta, Path, Token, parse_macro_input, parse_str,
    punctuated::Punctuated,
};

struct InvoiceEntityConfig {
    traits_path: Path,
    record_path: Path,
    kind: Option<Ident>,
}

impl Default for InvoiceEntityConfig {
    fn default() -> Self {
        Self {
            traits_path: parse_str("crate::db::dao::base_traits")
                .expect("default traits path should parse"),
            record_path: parse_str("crate::db::entities::invoice")
                .expect("default record path should parse"),
            kind: None,
        }
    }
}

/// Injects the columns shared by every EDI invoice table into a sea-orm
/// `Model` and implements the DAO traits that address them.
///
/// ```ignore
/// #[invoice_entity(kind = "Failed")]
/// #[sea_orm::model]
/// #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
/// #[sea_orm(table_name = "zodiac_invoice_failed_edi")]
/// pub struct Model {}
/// ```
#[proc_macro_attribute]
pub fn invoice_entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr with Punctuated<Meta, Token![,]>::parse_terminated);
    let mut config = InvoiceEntityConfig::default();
    if let Err(err) = apply_args(&mut config, args) {
        return err.to_compile_error().into();
    }

    let mut input = parse_macro_input!(item as ItemStruct);
    let Some(kind) = config.kind.clone() else {
        return syn::Error::new_spanned(
            &input.ident,
            "invoice_entity requires `kind = \"Success\"` or `kind = \"Failed\"`",
        )
        .to_compile_error()
        .into();
    };

    let fields = match &mut input.fields {
        Fields::Named(fields) => fields,
        _ => {
            return syn::Error::new_spanned(
                input,
                "invoice_entity requires a struct with named fields",
            )
            .to_compile_error()
            .into();
        }
    };

    let existing: HashSet<String> = fields
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref().map(|ident| ident.to_string()))
        .collect();

    let shared: Vec<syn::Field> = vec![
        syn::parse_quote! {
            #[sea_orm(primary_key)]
            pub id: i32
        },
        syn::parse_quote! {
            #[sea_orm(unique)]
            pub tracking_id: uuid::Uuid
        },
        syn::parse_quote! {
            pub user_id: i32
        },
        syn::parse_quote! {
            #[sea_orm(default_expr = "Expr::current_timestamp()")]
            pub uploaded_at: sea_orm::entity::prelude::DateTimeWithTimeZone
        },
        syn::parse_quote! {
            #[sea_orm(column_type = "Text", nullable)]
            pub xml_path: Option<String>
        },
        syn::parse_quote! {
            pub xml_validation_pass: bool
        },
        syn::parse_quote! {
            #[sea_orm(column_type = "Text", nullable)]
            pub xml_convert_message: Option<String>
        },
        syn::parse_quote! {
            #[sea_orm(column_type = "Text", nullable)]
            pub edi_path: Option<String>
        },
        syn::parse_quote! {
            pub edi_convert_pass: bool
        },
        syn::parse_quote! {
            #[sea_orm(column_type = "Text", nullable)]
            pub edi_convert_message: Option<String>
        },
        syn::parse_quote! {
            pub deleted_at: Option<sea_orm::entity::prelude::DateTimeWithTimeZone>
        },
        syn::parse_quote! {
            #[sea_orm(column_type = "Json", nullable)]
            pub processing_steps_error: Option<sea_orm::entity::prelude::Json>
        },
        syn::parse_quote! {
            #[sea_orm(column_type = "Text", nullable)]
            pub blob_xml_path: Option<String>
        },
        syn::parse_quote! {
            #[sea_orm(column_type = "Text", nullable)]
            pub blob_edi_path: Option<String>
        },
        syn::parse_quote! {
            #[sea_orm(default_value = "web")]
            pub request_type: String
        },
    ];

    let mut new_fields = Punctuated::new();
    for field in shared {
        let name = field
            .ident
            .as_ref()
            .map(|ident| ident.to_string())
            .unwrap_or_default();
        if !existing.contains(&name) {
            new_fields.push(field);
        }
    }

    for field in fields.named.iter().cloned() {
        new_fields.push(field);
    }

    fields.named = new_fields;

    let traits_path = config.traits_path;
    let record_path = config.record_path;

    let expanded = quote! {
        #input

        impl #traits_path::HasDefaultOrder for Entity {
            fn default_order_column() -> Column {
                Column::UploadedAt
            }
        }

        impl #traits_path::InvoiceEntity for Entity {
            const KIND: #record_path::InvoiceKind = #record_path::InvoiceKind::#kind;

            fn id_column() -> Column {
                Column::Id
            }

            fn user_id_column() -> Column {
                Column::UserId
            }

            fn tracking_id_column() -> Column {
                Column::TrackingId
            }

            fn deleted_at_column() -> Column {
                Column::DeletedAt
            }

            fn into_record(model: Model) -> #record_path::InvoiceRecord {
                #record_path::InvoiceRecord {
                    kind: #record_path::InvoiceKind::#kind,
                    id: model.id,
                    tracking_id: model.tracking_id,
                    user_id: model.user_id,
                    uploaded_at: model.uploaded_at,
                    xml_path: model.xml_path,
                    xml_validation_pass: model.xml_validation_pass,
                    xml_convert_message: model.xml_convert_message,
                    edi_path: model.edi_path,
                    edi_convert_pass: model.edi_convert_pass,
                    edi_convert_message: model.edi_convert_message,
                    deleted_at: model.deleted_at,
                    processing_steps_error: model.processing_steps_error,
                    blob_xml_path: model.blob_xml_path,
                    blob_edi_path: model.blob_edi_path,
                    request_type: model.request_type,
                }
            }
        }
    };

    expanded.into()
}

fn apply_args(
    config: &mut InvoiceEntityConfig,
    args: Punctuated<Meta, Token![,]>,
) -> Result<(), syn::Error> {
    for meta in args {
        let Meta::NameValue(name_value) = meta else {
            return Err(syn::Error::new_spanned(
                meta,
                "expected name-value pair, e.g. kind = \"Success\"",
            ));
        };

        let Some(ident) = name_value.path.get_ident() else {
            return Err(syn::Error::new_spanned(
                name_value.path,
                "expected simple identifier for attribute key",
            ));
        };

        let value = match name_value.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit_str),
                ..
            }) => lit_str,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected string literal for attribute value",
                ));
            }
        };

        match ident.to_string().as_str() {
            "traits" => {
                config.traits_path = value.parse::<Path>().map_err(|err| {
                    syn::Error::new(value.span(), format!("invalid traits path: {err}"))
                })?;
            }
            "record" => {
                config.record_path = value.parse::<Path>().map_err(|err| {
                    syn::Error::new(value.span(), format!("invalid record path: {err}"))
                })?;
            }
            "kind" => match value.value().as_str() {
                "Success" | "Failed" => {
                    config.kind = Some(Ident::new(&value.value(), value.span()));
                }
                _ => {
                    return Err(syn::Error::new(
                        value.span(),
                        "kind must be \"Success\" or \"Failed\"",
                    ));
                }
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "unknown invoice_entity attribute key",
                ));
            }
        }
    }

    Ok(())
}
