// src/exporters/xml.rs
use crate::exporters::{ExportFormat, Exporter};
use crate::nfce::models::ParseResult;
use crate::utils::error::ExportError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Writes the `<NotaFiscal>` exchange document consumed by ERP imports.
#[derive(Debug, Default)]
pub struct XmlExporter;

type XmlWriter = Writer<Vec<u8>>;

fn write(writer: &mut XmlWriter, event: Event) -> Result<(), ExportError> {
    writer
        .write_event(event)
        .map_err(|e| ExportError::Xml(e.to_string()))
}

fn open(writer: &mut XmlWriter, tag: &str) -> Result<(), ExportError> {
    write(writer, Event::Start(BytesStart::new(tag)))
}

fn close(writer: &mut XmlWriter, tag: &str) -> Result<(), ExportError> {
    write(writer, Event::End(BytesEnd::new(tag)))
}

/// `<tag>value</tag>`; the text event is written even when empty so the
/// indenting writer keeps `<tag></tag>` on one line.
fn field(writer: &mut XmlWriter, tag: &str, value: &str) -> Result<(), ExportError> {
    open(writer, tag)?;
    // BytesText::new escapes < > & ' "
    write(writer, Event::Text(BytesText::new(value)))?;
    close(writer, tag)
}

impl Exporter for XmlExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xml
    }

    fn export(&self, result: &ParseResult) -> Result<Vec<u8>, ExportError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        let header = &result.header;
        let issuer = &result.issuer;

        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        open(&mut writer, "NotaFiscal")?;

        open(&mut writer, "Cabecalho")?;
        field(&mut writer, "Numero", &header.document_number)?;
        field(&mut writer, "Chave", &header.access_key)?;
        field(&mut writer, "DataEmissao", &header.issue_date)?;
        field(&mut writer, "ValorTotal", &header.total_amount)?;
        field(&mut writer, "Protocolo", &header.authorization_protocol)?;
        open(&mut writer, "Emitente")?;
        field(&mut writer, "Nome", &issuer.name)?;
        field(&mut writer, "CNPJ", &issuer.tax_id)?;
        field(&mut writer, "IE", &issuer.state_registration)?;
        field(&mut writer, "Endereco", &issuer.address)?;
        field(&mut writer, "Municipio", &issuer.municipality)?;
        field(&mut writer, "UF", &issuer.state_code)?;
        close(&mut writer, "Emitente")?;
        close(&mut writer, "Cabecalho")?;

        open(&mut writer, "Produtos")?;
        for item in &result.items {
            open(&mut writer, "Produto")?;
            field(&mut writer, "Item", &item.sequence_number)?;
            field(&mut writer, "Codigo", &item.product_code)?;
            field(&mut writer, "Descricao", &item.description)?;
            field(&mut writer, "NCM", &item.ncm_code)?;
            field(&mut writer, "Quantidade", &item.quantity)?;
            field(&mut writer, "Unidade", &item.unit_of_measure)?;
            field(&mut writer, "ValorUnitario", &item.unit_price)?;
            field(&mut writer, "ValorTotal", &item.total_price)?;
            close(&mut writer, "Produto")?;
        }
        close(&mut writer, "Produtos")?;

        close(&mut writer, "NotaFiscal")?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        tracing::debug!("XML export: {} bytes, {} products", bytes.len(), result.item_count());
        Ok(bytes)
    }
}
