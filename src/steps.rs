//! The category-filtering patch for the tools home page
//!
//! Thirteen ordered steps add category state, a `fetchCategories` loader,
//! category-aware `fetchTools` calls, pill-shaped filter buttons, and the
//! modal props that consume the category list. Anchors are matched byte for
//! byte against the page's two-space JSX indentation.

use crate::patcher::{Edit, Step};

/// Page patched when no file is given on the command line or in config
pub const DEFAULT_TARGET: &str = "src/pages/Home.jsx";

const STATE_ANCHOR: &str = concat!(
    "  const [totalResults, setTotalResults] = useState(0);\n",
    "  const debounceTimer = useRef(null);",
);

const STATE_REPLACEMENT: &str = concat!(
    "  const [totalResults, setTotalResults] = useState(0);\n",
    "  const [categories, setCategories] = useState([\"Todas\"]);\n",
    "  const [selectedCategory, setSelectedCategory] = useState(\"Todas\");\n",
    "  const debounceTimer = useRef(null);",
);

const FETCH_TOOLS_COMMENT: &str = "  // Fetch tools - either default or search";

const FETCH_CATEGORIES: &str = concat!(
    "  // Fetch categories\n",
    "  const fetchCategories = async () => {\n",
    "    try {\n",
    "      const { data, error } = await supabase\n",
    "        .from('tools')\n",
    "        .select('category')\n",
    "        .not('category', 'is', null);\n",
    "      \n",
    "      if (error) throw error;\n",
    "      \n",
    "      const uniqueCategories = [...new Set(data.map(t => t.category))];\n",
    "      setCategories([\"Todas\", ...uniqueCategories.sort()]);\n",
    "    } catch (error) {\n",
    "      console.error('Error fetching categories:', error);\n",
    "    }\n",
    "  };\n",
    "\n",
    "  // Fetch tools - either default or search",
);

const SIGNATURE_ANCHOR: &str = "  const fetchTools = async (page = 1, search = \"\") => {";
const SIGNATURE_REPLACEMENT: &str =
    "  const fetchTools = async (page = 1, search = \"\", category = \"Todas\") => {";

const SEARCH_BRANCH_ANCHOR: &str = concat!(
    "        setTools(data || []);\n",
    "        setTotalResults(data?.length || 0);\n",
    "      } else {",
);

const SEARCH_BRANCH_REPLACEMENT: &str = concat!(
    "        // Filter by category if not \"Todas\"\n",
    "        let filteredData = data || [];\n",
    "        if (category !== \"Todas\") {\n",
    "          filteredData = filteredData.filter(t => t.category === category);\n",
    "        }\n",
    "        \n",
    "        setTools(filteredData);\n",
    "        setTotalResults(filteredData.length);\n",
    "      } else {",
);

const DEFAULT_BRANCH_ANCHOR: &str = concat!(
    "        const startRange = (page - 1) * ITEMS_PER_PAGE;\n",
    "        const endRange = startRange + ITEMS_PER_PAGE - 1;\n",
    "        \n",
    "        const { data, error, count } = await supabase\n",
    "          .from('tools')\n",
    "          .select('*', { count: 'exact' })\n",
    "          .order('name', { ascending: true })\n",
    "          .range(startRange, endRange);",
);

const DEFAULT_BRANCH_REPLACEMENT: &str = concat!(
    "        const startRange = (page - 1) * ITEMS_PER_PAGE;\n",
    "        const endRange = startRange + ITEMS_PER_PAGE - 1;\n",
    "        \n",
    "        let query = supabase\n",
    "          .from('tools')\n",
    "          .select('*', { count: 'exact' })\n",
    "          .order('name', { ascending: true });\n",
    "        \n",
    "        // Apply category filter if not \"Todas\"\n",
    "        if (category !== \"Todas\") {\n",
    "          query = query.eq('category', category);\n",
    "        }\n",
    "        \n",
    "        const { data, error, count } = await query.range(startRange, endRange);",
);

const MOUNT_EFFECT_ANCHOR: &str = concat!(
    "  useEffect(() => {\n",
    "    fetchTools(1, \"\");\n",
    "  }, []);",
);

const MOUNT_EFFECT_REPLACEMENT: &str = concat!(
    "  useEffect(() => {\n",
    "    fetchCategories();\n",
    "    fetchTools(1, \"\", \"Todas\");\n",
    "  }, []);",
);

const CALCULATE_PAGES_COMMENT: &str = "  // Calculate total pages";

const HANDLE_CATEGORY_CHANGE: &str = concat!(
    "\n",
    "  // Handle category change\n",
    "  const handleCategoryChange = (category) => {\n",
    "    setSelectedCategory(category);\n",
    "    setCurrentPage(1);\n",
    "    fetchTools(1, searchTerm, category);\n",
    "  };\n",
    "\n",
    "  // Calculate total pages",
);

const UPDATED_ANCHOR: &str = concat!(
    "        toast.success(\"✅ Herramienta actualizada\");\n",
    "        // Refresh current page\n",
    "        fetchTools(currentPage, searchTerm);",
);

const UPDATED_REPLACEMENT: &str = concat!(
    "        toast.success(\"✅ Herramienta actualizada\");\n",
    "        // Refresh current page\n",
    "        fetchCategories();\n",
    "        fetchTools(currentPage, searchTerm, selectedCategory);",
);

const CREATED_ANCHOR: &str = concat!(
    "        toast.success(\"✅ Herramienta creada con éxito\");\n",
    "        // Refresh current page\n",
    "        fetchTools(currentPage, searchTerm);",
);

const CREATED_REPLACEMENT: &str = concat!(
    "        toast.success(\"✅ Herramienta creada con éxito\");\n",
    "        // Refresh current page\n",
    "        fetchCategories();\n",
    "        fetchTools(currentPage, searchTerm, selectedCategory);",
);

const DELETED_ANCHOR: &str = concat!(
    "      toast.success(\"✅ Herramienta eliminada\");\n",
    "      setShowDeleteConfirm(false);\n",
    "      // Refresh current page\n",
    "      fetchTools(currentPage, searchTerm);",
);

const DELETED_REPLACEMENT: &str = concat!(
    "      toast.success(\"✅ Herramienta eliminada\");\n",
    "      setShowDeleteConfirm(false);\n",
    "      // Refresh current page\n",
    "      fetchCategories();\n",
    "      fetchTools(currentPage, searchTerm, selectedCategory);",
);

/// Closing tags of the search header, including the search input's own `</div>`
const SEARCH_HEADER_END: &str = concat!(
    "            </div>\n",
    "          </div>\n",
    "        </div>\n",
    "      </div>\n",
    "\n",
    "      {/* --- RESULTADOS (GRILLA) --- */",
);

const PILLS_ANCHOR: &str = concat!(
    "          </div>\n",
    "        </div>\n",
    "      </div>\n",
    "\n",
    "      {/* --- RESULTADOS (GRILLA) --- */",
);

const PILLS_REPLACEMENT: &str = concat!(
    "          </div>\n",
    "\n",
    "          {/* Filtros de Categoría (Pill Shapes) */}\n",
    "          <div className=\"flex gap-2 overflow-x-auto pb-2 no-scrollbar\">\n",
    "            {categories.map(cat => (\n",
    "              <button\n",
    "                key={cat}\n",
    "                onClick={() => handleCategoryChange(cat)}\n",
    "                className={`whitespace-nowrap px-4 py-1.5 rounded-full text-sm font-medium transition-all ${\n",
    "                  selectedCategory === cat \n",
    "                    ? 'bg-blue-600 text-white shadow-lg shadow-blue-900/50' \n",
    "                    : 'bg-slate-800 text-slate-300 hover:bg-slate-700 border border-slate-700'\n",
    "                }`}\n",
    "              >\n",
    "                {cat}\n",
    "              </button>\n",
    "            ))}\n",
    "          </div>\n",
    "        </div>\n",
    "      </div>\n",
    "\n",
    "      {/* --- RESULTADOS (GRILLA) --- */",
);

const COMPACT_PAGE_LABEL_ANCHOR: &str =
    "                  <span className=\"text-slate-700 font-medium px-3\">";
const COMPACT_PAGE_LABEL_REPLACEMENT: &str =
    "                  <span className=\"text-slate-900 font-bold px-3\">";

const PAGE_LABEL_ANCHOR: &str = "                <span className=\"text-slate-700 font-medium px-4\">";
const PAGE_LABEL_REPLACEMENT: &str = "                <span className=\"text-slate-900 font-bold px-4\">";

const EXISTING_CATEGORIES_ANCHOR: &str = "        existingCategories={[]}";
const EXISTING_CATEGORIES_REPLACEMENT: &str =
    "        existingCategories={categories.filter(c => c !== \"Todas\")}";

const MODAL_CATEGORIES_ANCHOR: &str = concat!(
    "        categories={[]}\n",
    "        onRefresh={() => fetchTools(currentPage, searchTerm)}",
);

const MODAL_CATEGORIES_REPLACEMENT: &str = concat!(
    "        categories={categories}\n",
    "        onRefresh={() => {\n",
    "          fetchCategories();\n",
    "          fetchTools(currentPage, searchTerm, selectedCategory);\n",
    "        }}",
);

/// The thirteen steps, in application order.
pub fn catalogue() -> Vec<Step> {
    vec![
        Step::new(
            1,
            "Add categories and selectedCategory state",
            vec![Edit::replace(STATE_ANCHOR, STATE_REPLACEMENT)],
        ),
        Step::new(
            2,
            "Add fetchCategories before fetchTools",
            vec![Edit::replace(FETCH_TOOLS_COMMENT, FETCH_CATEGORIES)],
        ),
        Step::new(
            3,
            "Add category parameter to fetchTools",
            vec![Edit::replace(SIGNATURE_ANCHOR, SIGNATURE_REPLACEMENT)],
        ),
        Step::new(
            4,
            "Filter search results by category",
            vec![Edit::replace(SEARCH_BRANCH_ANCHOR, SEARCH_BRANCH_REPLACEMENT)],
        ),
        Step::new(
            5,
            "Filter default query by category",
            vec![Edit::replace(DEFAULT_BRANCH_ANCHOR, DEFAULT_BRANCH_REPLACEMENT)],
        ),
        Step::new(
            6,
            "Load categories on mount",
            vec![Edit::replace(MOUNT_EFFECT_ANCHOR, MOUNT_EFFECT_REPLACEMENT)],
        ),
        Step::new(
            7,
            "Pass category to debounced search",
            vec![Edit::replace(
                "      fetchTools(1, searchTerm);",
                "      fetchTools(1, searchTerm, selectedCategory);",
            )],
        ),
        Step::new(
            8,
            "Pass category on page change",
            vec![Edit::replace(
                "    fetchTools(newPage, searchTerm);",
                "    fetchTools(newPage, searchTerm, selectedCategory);",
            )],
        ),
        Step::new(
            9,
            "Add handleCategoryChange",
            vec![Edit::replace(CALCULATE_PAGES_COMMENT, HANDLE_CATEGORY_CHANGE)],
        ),
        Step::new(
            10,
            "Refresh categories after create, update, and delete",
            vec![
                Edit::replace(UPDATED_ANCHOR, UPDATED_REPLACEMENT),
                Edit::replace(CREATED_ANCHOR, CREATED_REPLACEMENT),
                Edit::replace(DELETED_ANCHOR, DELETED_REPLACEMENT),
            ],
        ),
        Step::new(
            11,
            "Insert category filter pills below the search box",
            vec![Edit::guarded(SEARCH_HEADER_END, PILLS_ANCHOR, PILLS_REPLACEMENT)],
        ),
        Step::new(
            12,
            "Raise pagination label contrast",
            vec![
                Edit::replace(COMPACT_PAGE_LABEL_ANCHOR, COMPACT_PAGE_LABEL_REPLACEMENT),
                Edit::replace(PAGE_LABEL_ANCHOR, PAGE_LABEL_REPLACEMENT),
            ],
        ),
        Step::new(
            13,
            "Pass categories to the tool modals",
            vec![
                Edit::replace(EXISTING_CATEGORIES_ANCHOR, EXISTING_CATEGORIES_REPLACEMENT),
                Edit::replace(MODAL_CATEGORIES_ANCHOR, MODAL_CATEGORIES_REPLACEMENT),
            ],
        ),
    ]
}

/// A buffer holding every anchor of the catalogue, one block per edit.
///
/// Step 11's anchor is carried by its guard text, which contains it.
pub fn anchor_fixture() -> String {
    let mut blocks = Vec::new();
    for step in catalogue() {
        for edit in &step.edits {
            match edit {
                Edit::Replace { anchor, .. } => blocks.push(anchor.clone()),
                Edit::Guarded { guard, .. } => blocks.push(guard.clone()),
            }
        }
    }
    blocks.join("\n\n") + "\n"
}
