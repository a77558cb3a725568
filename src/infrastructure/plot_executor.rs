//! 绘图执行器 - 基础设施层
//!
//! 题库中存储的绘图代码会被原样执行，没有任何沙箱。
//! 整个程序里只有这里会启动解释器执行代码，只暴露"代码 → PNG 字节"的能力。

use std::future::Future;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::RenderError;

/// PNG 文件头
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// 在子进程中执行的包装脚本
///
/// 从 stdin 读取绘图代码，PNG 写到 stdout，异常堆栈写到 stderr。
/// 执行期间 `sys.stdout` 指向 stderr，代码里的 print 不会混进图片数据
const PLOT_HARNESS: &str = r#"
import io, sys, traceback
out = sys.stdout.buffer
sys.stdout = sys.stderr
try:
    import matplotlib
    matplotlib.use("Agg")
    import matplotlib.pyplot as plt
    import numpy as np
    plt.clf()
    plt.close("all")
    plt.rcParams.update({"text.usetex": False})
    code = sys.stdin.read()
    exec(code, {"plt": plt, "np": np})
    buf = io.BytesIO()
    plt.savefig(buf, format="png", bbox_inches="tight", dpi=int(sys.argv[1]))
    sys.stdout = sys.__stdout__
    out.write(buf.getvalue())
    out.flush()
except Exception:
    sys.stderr.write(traceback.format_exc())
    sys.exit(1)
"#;

/// 绘图后端
///
/// 职责：
/// - 执行一段绘图代码，返回 PNG 字节
/// - 不认识 Question / RichNode
pub trait PlotBackend {
    fn render_png(&self, code: &str) -> impl Future<Output = Result<Vec<u8>, RenderError>> + Send;
}

/// 基于 Python + matplotlib 子进程的绘图执行器
#[derive(Debug, Clone)]
pub struct PythonPlotExecutor {
    python_bin: String,
    dpi: u32,
}

impl PythonPlotExecutor {
    /// 创建新的绘图执行器
    pub fn new(python_bin: impl Into<String>, dpi: u32) -> Self {
        Self {
            python_bin: python_bin.into(),
            dpi,
        }
    }
}

impl PlotBackend for PythonPlotExecutor {
    async fn render_png(&self, code: &str) -> Result<Vec<u8>, RenderError> {
        let session = PlotSession::open(&self.python_bin, self.dpi)?;
        session.run(code).await
    }
}

/// 一次绘图会话
///
/// 每次绘图都是全新的解释器进程：画布状态在会话开始时清空，
/// 会话结束（或被丢弃）时进程随之销毁，节点之间互不影响。
struct PlotSession {
    child: Child,
}

impl PlotSession {
    fn open(python_bin: &str, dpi: u32) -> Result<Self, RenderError> {
        debug!("启动绘图进程: {} (dpi={})", python_bin, dpi);

        let child = Command::new(python_bin)
            .arg("-c")
            .arg(PLOT_HARNESS)
            .arg(dpi.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::SpawnFailed {
                program: python_bin.to_string(),
                source,
            })?;

        Ok(Self { child })
    }

    async fn run(mut self, code: &str) -> Result<Vec<u8>, RenderError> {
        // 先写完 stdin 再读输出：脚本在读完代码之前不会产生任何输出
        // 写入失败通常是解释器提前退出（如缺少 matplotlib），以 stderr 为准
        if let Some(mut stdin) = self.child.stdin.take() {
            if let Err(e) = stdin.write_all(code.as_bytes()).await {
                debug!("写入绘图代码失败: {}", e);
            }
        }

        let output = self.child.wait_with_output().await?;

        if !output.status.success() {
            let traceback = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            return Err(RenderError::ScriptFailed {
                traceback: if traceback.is_empty() {
                    format!("绘图进程异常退出: {}", output.status)
                } else {
                    traceback
                },
            });
        }

        check_png(output.stdout)
    }
}

/// 校验输出确实是 PNG
pub fn check_png(bytes: Vec<u8>) -> Result<Vec<u8>, RenderError> {
    if bytes.is_empty() {
        return Err(RenderError::EmptyImage);
    }
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(RenderError::NotPng { len: bytes.len() });
    }
    Ok(bytes)
}
