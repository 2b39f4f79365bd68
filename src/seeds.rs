//! Built-in content: code snippets per language and the Vim command drill list.
//! Guarantees the app is usable without a generator or extra config.

use serde::Serialize;

pub const SUPPORTED_LANGUAGES: &[&str] = &["python", "javascript", "typescript", "rust", "go", "c", "cpp"];

const PYTHON: &[&str] = &[
  "def fibonacci(n):\n    if n <= 1:\n        return n\n    return fibonacci(n-1) + fibonacci(n-2)",
  "def binary_search(arr, target):\n    left, right = 0, len(arr) - 1\n    while left <= right:\n        mid = (left + right) // 2\n        if arr[mid] == target:\n            return mid\n        elif arr[mid] < target:\n            left = mid + 1\n        else:\n            right = mid - 1\n    return -1",
  "class Stack:\n    def __init__(self):\n        self.items = []\n\n    def push(self, item):\n        self.items.append(item)\n\n    def pop(self):\n        return self.items.pop()",
];

const JAVASCRIPT: &[&str] = &[
  "const fetchData = async (url) => {\n  try {\n    const response = await fetch(url);\n    return await response.json();\n  } catch (error) {\n    console.error(error);\n  }\n};",
  "function debounce(func, delay) {\n  let timeoutId;\n  return function(...args) {\n    clearTimeout(timeoutId);\n    timeoutId = setTimeout(() => func.apply(this, args), delay);\n  };\n}",
  "const quickSort = (arr) => {\n  if (arr.length <= 1) return arr;\n  const pivot = arr[0];\n  const left = arr.slice(1).filter(x => x < pivot);\n  const right = arr.slice(1).filter(x => x >= pivot);\n  return [...quickSort(left), pivot, ...quickSort(right)];\n};",
];

const RUST: &[&str] = &[
  "fn main() {\n    let numbers: Vec<i32> = (1..=10).collect();\n    let sum: i32 = numbers.iter().sum();\n    println!(\"Sum: {}\", sum);\n}",
  "impl Iterator for Counter {\n    type Item = u32;\n\n    fn next(&mut self) -> Option<Self::Item> {\n        self.count += 1;\n        if self.count < 6 {\n            Some(self.count)\n        } else {\n            None\n        }\n    }\n}",
];

const GO: &[&str] = &[
  "func main() {\n    http.HandleFunc(\"/\", handler)\n    log.Fatal(http.ListenAndServe(\":8080\", nil))\n}\n\nfunc handler(w http.ResponseWriter, r *http.Request) {\n    fmt.Fprintf(w, \"Hello, World!\")\n}",
  "func worker(id int, jobs <-chan int, results chan<- int) {\n    for j := range jobs {\n        results <- j * 2\n    }\n}",
];

const C: &[&str] = &[
  "int main() {\n    int *arr = malloc(10 * sizeof(int));\n    for (int i = 0; i < 10; i++) {\n        arr[i] = i * i;\n    }\n    free(arr);\n    return 0;\n}",
  "void quicksort(int arr[], int low, int high) {\n    if (low < high) {\n        int pi = partition(arr, low, high);\n        quicksort(arr, low, pi - 1);\n        quicksort(arr, pi + 1, high);\n    }\n}",
];

/// Built-in snippets for a supported language. TypeScript shares JavaScript's, C++ shares C's.
pub fn seed_snippets(language: &str) -> Option<&'static [&'static str]> {
  match language {
    "python" => Some(PYTHON),
    "javascript" | "typescript" => Some(JAVASCRIPT),
    "rust" => Some(RUST),
    "go" => Some(GO),
    "c" | "cpp" => Some(C),
    _ => None,
  }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct VimCommand {
  pub keys: &'static str,
  pub description: &'static str,
}

macro_rules! cmd {
  ($keys:expr, $desc:expr) => {
    VimCommand { keys: $keys, description: $desc }
  };
}

pub const VIM_COMMANDS: &[VimCommand] = &[
  cmd!("dd", "delete line"),
  cmd!("yy", "yank line"),
  cmd!("p", "paste"),
  cmd!("ciw", "change inner word"),
  cmd!("diw", "delete inner word"),
  cmd!("gg", "go to top"),
  cmd!("G", "go to bottom"),
  cmd!(":wq", "save and quit"),
  cmd!(":q!", "quit without saving"),
  cmd!("/search", "search forward"),
  cmd!("n", "next search result"),
  cmd!("N", "previous search result"),
  cmd!(":%s/old/new/g", "replace all"),
  cmd!("vip", "select paragraph"),
  cmd!("=G", "indent to end"),
  cmd!("zz", "center cursor"),
  cmd!("ctrl+d", "half page down"),
  cmd!("ctrl+u", "half page up"),
  cmd!("o", "new line below"),
  cmd!("O", "new line above"),
  cmd!("A", "append at end of line"),
  cmd!("I", "insert at start of line"),
  cmd!("w", "next word"),
  cmd!("b", "previous word"),
  cmd!("0", "start of line"),
  cmd!("$", "end of line"),
  cmd!("f{char}", "find char forward"),
  cmd!("t{char}", "till char forward"),
  cmd!("ci(", "change inside parens"),
  cmd!("da\"", "delete around quotes"),
  cmd!("%", "jump to matching bracket"),
  cmd!("}", "next paragraph"),
];
