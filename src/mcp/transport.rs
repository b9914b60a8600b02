//! Transporte JSON delimitado por newline.
//!
//! Cada mensagem é um objeto JSON-RPC compacto numa única linha:
//!
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}
//! {"jsonrpc":"2.0","id":1,"result":{...}}
//! ```

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

use crate::SupportResult;

use super::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Uma linha lida do cliente.
#[derive(Debug)]
pub enum Incoming {
    Request(JsonRpcRequest),
    /// A linha não era uma requisição válida.
    Malformed(String),
}

/// JSON-RPC sobre qualquer par leitor/escritor orientado a linhas.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// O transporte usado por `supportloop serve`.
pub type StdioTransport = LineTransport<BufReader<Stdin>, Stdout>;

impl StdioTransport {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Próxima mensagem, pulando linhas em branco. `None` quando o cliente desconecta.
    pub async fn read_message(&mut self) -> SupportResult<Option<Incoming>> {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(None);
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    tracing::warn!(error = %e, "Message is not valid UTF-8");
                    return Ok(Some(Incoming::Malformed(e.to_string())));
                }
            };
            if line.is_empty() {
                continue;
            }

            return Ok(Some(match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => {
                    tracing::debug!(method = %request.method, id = ?request.id, "Received request");
                    Incoming::Request(request)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed message");
                    Incoming::Malformed(e.to_string())
                }
            }));
        }
    }

    /// Escreve uma linha de resposta e faz flush.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> SupportResult<()> {
        let mut body = serde_json::to_vec(response)?;
        body.push(b'\n');

        self.writer.write_all(&body).await?;
        // Clientes esperam cada linha
        self.writer.flush().await?;

        tracing::debug!(id = ?response.id, is_error = response.is_error(), "Sent response");
        Ok(())
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
