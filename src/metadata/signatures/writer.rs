use crate::{
    metadata::{
        entities::TypeDefOrRef,
        signatures::{CallingConventionSig, MethodBaseSig, TypeSig, ELEMENT_TYPE},
        tables::CodedIndexType,
    },
    Result,
};

/// Largest value the compressed integer encoding can hold
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Append `value` in the compressed unsigned integer encoding of II.23.2
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `value` exceeds [`MAX_COMPRESSED_UINT`].
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    if value <= 0x7F {
        buffer.push(value as u8);
    } else if value <= 0x3FFF {
        buffer.push(0x80 | (value >> 8) as u8);
        buffer.push(value as u8);
    } else if value <= MAX_COMPRESSED_UINT {
        buffer.push(0xC0 | (value >> 24) as u8);
        buffer.push((value >> 16) as u8);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    } else {
        return Err(malformed_error!(
            "Value 0x{:x} does not fit a compressed integer",
            value
        ));
    }

    Ok(())
}

/// Encoder of signatures into blob payloads.
///
/// The inverse of [`crate::metadata::signatures::SignatureReader`]: everything the reader
/// produces can be written back. Type references are written with their tokens, so entities
/// created by hand need a row id before they can be part of an encoded signature.
#[derive(Default)]
pub struct SignatureWriter {
    buffer: Vec<u8>,
}

impl SignatureWriter {
    /// Encode a signature
    ///
    /// # Errors
    /// Returns an error if a count or index does not fit a compressed integer, or if a type
    /// reference has no row id.
    pub fn write(sig: &CallingConventionSig) -> Result<Vec<u8>> {
        let mut writer = SignatureWriter::default();
        writer.write_sig(sig)?;
        Ok(writer.buffer)
    }

    /// Encode a single type, as stored in a `TypeSpec` blob
    ///
    /// # Errors
    /// See [`SignatureWriter::write`].
    pub fn write_type_spec(sig: &TypeSig) -> Result<Vec<u8>> {
        let mut writer = SignatureWriter::default();
        writer.write_type(sig)?;
        Ok(writer.buffer)
    }

    fn write_sig(&mut self, sig: &CallingConventionSig) -> Result<()> {
        self.buffer.push(sig.calling_convention().0);

        match sig {
            CallingConventionSig::Method(method) | CallingConventionSig::Property(method) => {
                self.write_method_base(method)
            }
            CallingConventionSig::Field(field) => self.write_type(&field.field_type),
            CallingConventionSig::LocalSig(locals) => self.write_list(&locals.locals),
            CallingConventionSig::GenericInstMethod(inst) => self.write_list(&inst.generic_args),
        }
    }

    fn write_method_base(&mut self, sig: &MethodBaseSig) -> Result<()> {
        if sig.calling_convention.is_generic() {
            write_compressed_uint(sig.generic_param_count, &mut self.buffer)?;
        }

        self.write_count(sig.param_count())?;
        self.write_type(&sig.ret_type)?;

        for param in &sig.params {
            self.write_type(param)?;
        }

        if let Some(after) = sig.params_after_sentinel.as_ref().filter(|p| !p.is_empty()) {
            self.buffer.push(ELEMENT_TYPE::SENTINEL);
            for param in after {
                self.write_type(param)?;
            }
        }

        Ok(())
    }

    fn write_list(&mut self, types: &[TypeSig]) -> Result<()> {
        self.write_count(types.len())?;
        for sig in types {
            self.write_type(sig)?;
        }

        Ok(())
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| malformed_error!("Signature count {} is too large", count))?;
        write_compressed_uint(count, &mut self.buffer)
    }

    fn write_type(&mut self, sig: &TypeSig) -> Result<()> {
        self.buffer.push(sig.element_type());

        match sig {
            TypeSig::CorLib(_) => Ok(()),
            TypeSig::ValueType(type_ref) | TypeSig::Class(type_ref) => {
                self.write_type_def_or_ref(type_ref)
            }
            TypeSig::Ptr(next)
            | TypeSig::ByRef(next)
            | TypeSig::SzArray(next)
            | TypeSig::Pinned(next)
            | TypeSig::Sentinel(next) => self.write_type(next),
            TypeSig::CModReqd { modifier, next } | TypeSig::CModOpt { modifier, next } => {
                self.write_type_def_or_ref(modifier)?;
                self.write_type(next)
            }
            TypeSig::Var(index) | TypeSig::MVar(index) => {
                write_compressed_uint(*index, &mut self.buffer)
            }
            TypeSig::ValueArray { next, size } => {
                self.write_type(next)?;
                write_compressed_uint(*size, &mut self.buffer)
            }
            TypeSig::Module { index, next } => {
                write_compressed_uint(*index, &mut self.buffer)?;
                self.write_type(next)
            }
        }
    }

    fn write_type_def_or_ref(&mut self, type_ref: &TypeDefOrRef) -> Result<()> {
        let token = type_ref.token();
        if token.is_null() {
            return Err(malformed_error!(
                "Type {} has no row id and cannot be encoded",
                type_ref.full_name()
            ));
        }

        let (Some(table), rid) = (token.table_id(), token.rid()) else {
            return Err(malformed_error!("Invalid type token - {}", token));
        };

        let coded = CodedIndexType::TypeDefOrRef.encode(table, rid)?;
        write_compressed_uint(coded, &mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::{
        entities::TypeRef,
        signatures::{
            reader::tests::TestContext, CallingConvention, FieldSig, LocalSig, SignatureContext,
            SignatureReader,
        },
    };

    #[test]
    fn compressed_uint() {
        let cases: [(u32, &[u8]); 6] = [
            (0x03, &[0x03]),
            (0x7F, &[0x7F]),
            (0x80, &[0x80, 0x80]),
            (0x2E57, &[0xAE, 0x57]),
            (0x4000, &[0xC0, 0x00, 0x40, 0x00]),
            (0x1FFF_FFFF, &[0xDF, 0xFF, 0xFF, 0xFF]),
        ];

        for (value, expected) in cases {
            let mut buffer = Vec::new();
            write_compressed_uint(value, &mut buffer).unwrap();
            assert_eq!(buffer, expected, "0x{value:x}");
        }

        assert!(write_compressed_uint(0x2000_0000, &mut Vec::new()).is_err());
    }

    #[test]
    fn generic_vararg_method() {
        let context = TestContext::new();
        let corlib = context.corlib_types();

        // instance !!0 M<T, U>(!!1, class List`1[], ..., valuetype Guid, string)
        let sig = CallingConventionSig::Method(MethodBaseSig {
            calling_convention: CallingConvention(
                CallingConvention::VARARG | CallingConvention::GENERIC | CallingConvention::HAS_THIS,
            ),
            generic_param_count: 2,
            ret_type: TypeSig::MVar(0),
            params: vec![
                TypeSig::MVar(1),
                TypeSig::SzArray(Box::new(TypeSig::Class(context.type_ref(2)))),
            ],
            params_after_sentinel: Some(vec![
                TypeSig::ValueType(context.type_ref(1)),
                corlib.string(),
            ]),
        });

        let data = SignatureWriter::write(&sig).unwrap();
        #[rustfmt::skip]
        assert_eq!(data, [
            0x35, 0x02, 0x04,
            0x1E, 0x00,
            0x1E, 0x01,
            0x1D, 0x12, 0x09,
            0x41,
            0x11, 0x05,
            0x0E,
        ]);

        let decoded = SignatureReader::read(&context, &data, 50).unwrap();
        assert_eq!(decoded, sig);

        let method = decoded.as_method().unwrap();
        assert_eq!(method.params.len(), 2);
        assert_eq!(method.params_after_sentinel.as_ref().unwrap().len(), 2);
        assert_eq!(method.ret_type, TypeSig::MVar(0));
    }

    #[test]
    fn other_kinds() {
        let context = TestContext::new();
        let corlib = context.corlib_types();

        let sigs = [
            CallingConventionSig::Field(FieldSig {
                calling_convention: CallingConvention(CallingConvention::FIELD),
                field_type: TypeSig::CModOpt {
                    modifier: context.type_ref(3),
                    next: Box::new(TypeSig::Ptr(Box::new(corlib.int64()))),
                },
            }),
            CallingConventionSig::LocalSig(LocalSig {
                calling_convention: CallingConvention(CallingConvention::LOCAL_SIG),
                locals: vec![
                    TypeSig::Pinned(Box::new(TypeSig::ByRef(Box::new(corlib.object())))),
                    TypeSig::ValueArray {
                        next: Box::new(corlib.boolean()),
                        size: 0x200,
                    },
                ],
            }),
            CallingConventionSig::LocalSig(LocalSig {
                calling_convention: CallingConvention(CallingConvention::LOCAL_SIG),
                locals: vec![TypeSig::Sentinel(Box::new(TypeSig::SzArray(Box::new(
                    corlib.string(),
                ))))],
            }),
            CallingConventionSig::Property(MethodBaseSig::new(
                CallingConvention(CallingConvention::PROPERTY | CallingConvention::HAS_THIS),
                corlib.string(),
                vec![TypeSig::Var(0)],
            )),
        ];

        for sig in sigs {
            let data = SignatureWriter::write(&sig).unwrap();
            assert_eq!(SignatureReader::read(&context, &data, 50).unwrap(), sig);
        }
    }

    #[test]
    fn sentinel_type() {
        let context = TestContext::new();
        let sig = TypeSig::Sentinel(Box::new(TypeSig::Class(context.type_ref(1))));

        let data = SignatureWriter::write_type_spec(&sig).unwrap();
        assert_eq!(data, [0x41, 0x12, 0x05]);

        let decoded = SignatureReader::read_type_spec(&context, &data, 50).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn unsaved_type() {
        let unsaved = TypeRef::new(None, "Ns", "Unsaved");
        let sig = TypeSig::Class(TypeDefOrRef::TypeRef(Arc::new(unsaved)));
        assert!(SignatureWriter::write_type_spec(&sig).is_err());
    }
}
