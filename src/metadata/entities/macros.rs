/// Define an entity type backed by a raw row.
///
/// Every listed field becomes a [`crate::metadata::lazy::UserValue`] cell with a getter that
/// resolves it from the raw row on first access and a setter that overrides it. The resolver
/// receives the owning module and the cached row.
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $name:ident => $row:ident, $cache:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident, $setter:ident: $ty:ty => |$module:pat_param, $raw:pat_param| $resolve:expr;
            )+
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            token: crate::metadata::token::Token,
            origin: crate::metadata::entities::Origin<crate::metadata::tables::$row>,
            $($field: crate::metadata::lazy::UserValue<$ty>,)+
        }

        impl $name {
            fn with_origin(
                token: crate::metadata::token::Token,
                origin: crate::metadata::entities::Origin<crate::metadata::tables::$row>,
            ) -> Self {
                $name {
                    token,
                    origin,
                    $($field: crate::metadata::lazy::UserValue::new(),)+
                }
            }

            fn user() -> Self {
                Self::with_origin(
                    crate::metadata::token::Token::from_parts(
                        <Self as crate::metadata::entities::Entity>::TABLE,
                        0,
                    ),
                    crate::metadata::entities::Origin::User,
                )
            }

            /// Assign a row id to a user-created entity
            #[must_use]
            pub fn with_rid(mut self, rid: u32) -> Self {
                self.token = crate::metadata::token::Token::from_parts(
                    <Self as crate::metadata::entities::Entity>::TABLE,
                    rid,
                );
                self
            }

            /// `true` if this entity was read from metadata
            #[must_use]
            pub fn is_metadata(&self) -> bool {
                matches!(self.origin, crate::metadata::entities::Origin::Metadata { .. })
            }

            $(
                $(#[$field_meta])*
                #[must_use]
                pub fn $field(&self) -> $ty {
                    self.$field
                        .get_or_try_resolve(|| {
                            self.origin.with_row(
                                |$module: &crate::metadata::module::ModuleDef,
                                 $raw: &crate::metadata::tables::$row| $resolve,
                            )
                        })
                        .unwrap_or_default()
                }

                #[doc = concat!("Override [`", stringify!($name), "::", stringify!($field), "`]")]
                pub fn $setter(&self, value: $ty) {
                    self.$field.set(value);
                }
            )+
        }

        impl crate::metadata::entities::Entity for $name {
            const TABLE: crate::metadata::tables::TableId =
                <crate::metadata::tables::$row as crate::metadata::tables::RowReadable>::TABLE;

            fn token(&self) -> crate::metadata::token::Token {
                self.token
            }
        }

        impl crate::metadata::entities::MdEntity for $name {
            type Row = crate::metadata::tables::$row;

            fn from_md(module: std::sync::Weak<crate::metadata::module::ModuleDef>, rid: u32) -> Self {
                Self::with_origin(
                    crate::metadata::token::Token::from_parts(
                        <Self as crate::metadata::entities::Entity>::TABLE,
                        rid,
                    ),
                    crate::metadata::entities::Origin::metadata(module, rid),
                )
            }

            fn cache(
                caches: &crate::metadata::entities::EntityCaches,
            ) -> &crossbeam_skiplist::SkipMap<crate::metadata::token::Token, std::sync::Arc<Self>> {
                &caches.$cache
            }

            fn preload(&self) {
                $(let _ = self.$field();)+
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("token", &self.token)
                    .field("origin", &self.origin)
                    $(.field(stringify!($field), &self.$field))+
                    .finish()
            }
        }
    };
}
