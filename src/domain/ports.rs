use crate::domain::board::Board;
use crate::domain::model::{Color, Move, Response};
use crate::utils::error::{GtpError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
    /// 檔案的完整位置，用於日誌與分析輸出
    fn location(&self, path: &str) -> String;
}

pub trait MatchSettings: Send + Sync {
    fn black_command(&self) -> &str;
    fn white_command(&self) -> &str;
    fn games(&self) -> usize;
    fn board_size(&self) -> usize;
    fn komi(&self) -> f32;
    fn alternate(&self) -> bool;
    fn max_moves(&self) -> usize;
    fn results_dir(&self) -> &str;
    fn sgf_prefix(&self) -> &str;
    fn continue_on_error(&self) -> bool;
    fn force(&self) -> bool;
}

/// Move selection behind `genmove`. The session owns the board and
/// plays whatever the player returns, so implementations must not
/// mutate anything but their own state.
pub trait GoPlayer: Send {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn select_move(&mut self, board: &Board, color: Color) -> Move;
}

#[async_trait]
pub trait GtpClient: Send {
    fn label(&self) -> &str;

    async fn send(&mut self, command: &str) -> Result<Response>;

    async fn close(&mut self) -> Result<()>;

    /// 子行程的 PID（行程內客戶端沒有）
    fn pid(&self) -> Option<u32> {
        None
    }

    async fn expect_success(&mut self, command: &str) -> Result<String> {
        let response = self.send(command).await?;
        if response.is_success() {
            Ok(response.text)
        } else {
            Err(GtpError::EngineFailure {
                engine: self.label().to_string(),
                command: command.to_string(),
                message: response.text,
            })
        }
    }

    async fn known_command(&mut self, name: &str) -> Result<bool> {
        let response = self.send(&format!("known_command {}", name)).await?;
        Ok(response.is_success() && response.text.trim() == "true")
    }
}
